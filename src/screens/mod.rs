//! Screen orchestration
//!
//! Each screen runs one text-generation call, publishes the result, then fans
//! out independent image tasks that each fill a single slot. Nothing in the
//! flow waits for the images.

pub mod comic;
pub mod meme;
pub mod photo;
pub mod state;

pub use comic::{highlight_dialogue, ComicScreen, DialogueToken};
pub use meme::MemeScreen;
pub use photo::PhotoScreen;
pub use state::{Phase, ScreenState, SlotKey, SlotState};
