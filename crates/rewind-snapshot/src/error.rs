//! Checkpoint error types.

use rewind_storage::StorageError;
use thiserror::Error;

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Errors that can occur during checkpoint operations.
///
/// Parse failures of auxiliary metadata (config, manifests, changelog) never
/// show up here; they are recovered where they are read.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Every file in the project is ignored, or the project is empty.
    #[error("No files found to checkpoint")]
    NoFilesFound,

    /// No checkpoint name equals or contains the identifier.
    #[error("Checkpoint not found: {identifier}")]
    NotFound {
        identifier: String,
        /// Newest checkpoint names, offered as suggestions.
        candidates: Vec<String>,
    },

    /// A checkpoint with the generated name already exists.
    #[error("Checkpoint already exists: {0}")]
    AlreadyExists(String),

    /// The checkpoint archive is missing, unreadable or incomplete.
    #[error("Checkpoint archive is corrupted: {0}")]
    ArchiveCorruption(String),

    /// The project root is missing or not a directory.
    #[error("Invalid project root: {0}")]
    InvalidProjectRoot(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An ignore rule could not be compiled.
    #[error("Invalid ignore rule: {0}")]
    IgnoreRule(#[from] ignore::Error),

    /// A blocking filesystem task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CheckpointError {
    /// Create a not found error.
    pub fn not_found(identifier: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
            candidates,
        }
    }

    /// Create an archive corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::ArchiveCorruption(message.into())
    }
}
