//! Project checkpoints for rewind.
//!
//! This crate snapshots a whole project tree into a compressed archive and
//! restores it later:
//! - Gitignore-style exclusion rules, plus per-project extra rules
//! - Bounded retention of snapshots
//! - Emergency backup before every restore
//! - A short activity changelog
//!
//! Everything is stored under `<project>/.checkpoints/`.
//!
//! # Example
//!
//! ```no_run
//! use rewind_snapshot::{CheckpointManager, RestoreOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = CheckpointManager::new("/project/root");
//!
//! // Snapshot before a risky change
//! let created = manager.create(None, Some("Before refactor")).await?;
//!
//! // ... edit files ...
//!
//! // Roll back; the current state is kept as an emergency backup
//! if let RestoreOutcome::Restored(restored) = manager.restore(&created.name, false).await? {
//!     println!("backup: {:?}", restored.emergency_backup);
//! }
//! # Ok(())
//! # }
//! ```

mod archive;
pub mod changelog;
pub mod config;
mod error;
mod files;
mod manager;
mod manifest;
pub mod matcher;
pub mod naming;
mod restore;
mod store;

pub use changelog::{Changelog, ChangelogEntry, MAX_CHANGELOG_ENTRIES};
pub use config::{Config, ConfigOverrides, ConfigStore};
pub use error::{CheckpointError, CheckpointResult};
pub use manager::{
    CheckpointManager, CreatedCheckpoint, SetupReport, CHECKPOINT_DIR, EMERGENCY_BACKUP_PREFIX,
    IGNORE_FILE, IGNORE_FILE_HEADER, INITIAL_CHECKPOINT_NAME,
};
pub use manifest::Manifest;
pub use matcher::{IgnoreMatcher, IgnoreRule, RuleSource};
pub use restore::{RestoreOutcome, RestorePreview, RestoredCheckpoint};
pub use store::{format_size, SnapshotStore, MAX_CANDIDATES};
