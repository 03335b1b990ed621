//! Local key-value persistence
//!
//! Values are whole JSON documents addressed by a fixed key. Writes are
//! synchronous and replace the previous value wholesale.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
