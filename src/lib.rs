//! vocab-lens - an IELTS vocabulary companion
//!
//! Identifies a word from a photo, turns vocabulary into memes and four-panel
//! comics, and keeps a favorites archive. Text comes from a structured
//! generation backend; pictures come from an image backend that soft-fails to
//! deterministic placeholders.

pub mod ai;
pub mod app;
pub mod camera;
pub mod error;
pub mod favorites;
pub mod image;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod screens;
pub mod speech;
pub mod storage;

pub use error::{Error, ErrorKind, Result};
