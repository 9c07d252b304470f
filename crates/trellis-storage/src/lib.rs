//! # trellis-storage
//!
//! Durable local key-value storage for the Trellis progress engine.
//!
//! The engine persists per-learner progress snapshots and the current
//! identity record through this boundary and nothing else: `get`, `set`,
//! `remove`, string keys, serialized string values. Backends remain
//! adapters; this crate owns the contract.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage read failed for key `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("storage write failed for key `{key}`: {message}")]
    Write { key: String, message: String },

    #[error("storage remove failed for key `{key}`: {message}")]
    Remove { key: String, message: String },
}

/// Synchronous durable key-value storage.
///
/// Keys are opaque UTF-8 strings; values are serialized records. `get`
/// returns `None` for an absent key, and `remove` of an absent key is not
/// an error.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
