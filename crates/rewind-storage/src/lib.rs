//! Storage layer for rewind.
//!
//! Checkpoint metadata (configuration, changelog, snapshot manifests) is kept
//! as pretty-printed JSON documents under the checkpoint root. Keys are path
//! segments, e.g. `["snapshots", "initial_2024-01-01T00-00-00", "manifest"]`.

pub mod error;
pub mod json;

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A trait for JSON document storage backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a value from storage.
    ///
    /// Returns `None` if the key doesn't exist.
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>>;

    /// Write a value to storage.
    ///
    /// Creates parent directories if necessary.
    async fn write<T: Serialize + Send + Sync>(&self, key: &[&str], value: &T)
        -> StorageResult<()>;

    /// Check if a key exists.
    async fn exists(&self, key: &[&str]) -> StorageResult<bool>;
}
