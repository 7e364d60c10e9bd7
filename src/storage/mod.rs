//! Key-value persistence.
//!
//! The store keeps one JSON document per key:
//! - `tab:{id}` holds a [`crate::tab::Tab`] record
//! - `settings` holds the [`crate::settings::Settings`] record
//!
//! Access is synchronous. There are no transactions across keys.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A synchronous, process-local key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the write fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in no particular order.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be listed.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Keys are limited to ASCII letters, digits, `_`, `-` and `:`.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
