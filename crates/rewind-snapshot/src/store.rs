//! Snapshot storage.
//!
//! ```text
//! .checkpoints/
//!   snapshots/
//!     <name>/
//!       manifest.json   # Manifest
//!       files.tar.gz    # Archived project files
//! ```
//!
//! A directory without a readable manifest is not a snapshot and is skipped
//! by listing.

use crate::archive::{self, ARCHIVE_FILE};
use crate::{CheckpointError, CheckpointResult, Manifest};
use chrono::{DateTime, Utc};
use rewind_storage::{JsonStorage, Storage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Directory holding snapshots, relative to the checkpoint root.
pub const SNAPSHOTS_DIR: &str = "snapshots";

const MANIFEST_KEY: &str = "manifest";

/// Number of names suggested when an identifier matches nothing.
pub const MAX_CANDIDATES: usize = 5;

/// Reads and writes snapshot directories.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    storage: JsonStorage,
    snapshots_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store over the checkpoint root's storage.
    pub fn new(storage: JsonStorage) -> Self {
        let snapshots_dir = storage.base_path().join(SNAPSHOTS_DIR);
        Self {
            storage,
            snapshots_dir,
        }
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    pub fn snapshot_dir(&self, name: &str) -> PathBuf {
        self.snapshots_dir.join(name)
    }

    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.snapshot_dir(name).join(ARCHIVE_FILE)
    }

    /// Write a new snapshot of `files` under `name`.
    ///
    /// Fails with [`CheckpointError::AlreadyExists`] rather than overwrite.
    /// On any other failure the partially written directory is removed.
    pub async fn write(
        &self,
        name: &str,
        description: Option<String>,
        root: &Path,
        files: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> CheckpointResult<Manifest> {
        fs::create_dir_all(&self.snapshots_dir).await?;

        let dir = self.snapshot_dir(name);
        match fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CheckpointError::AlreadyExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        match self
            .write_contents(name, description, root, files, timestamp)
            .await
        {
            Ok(manifest) => {
                info!(
                    "Created checkpoint {} with {} files",
                    manifest.name, manifest.file_count
                );
                Ok(manifest)
            }
            Err(e) => {
                warn!("Failed to write checkpoint {}: {}", name, e);
                if let Err(cleanup) = fs::remove_dir_all(&dir).await {
                    warn!(
                        "Failed to remove partial checkpoint {}: {}",
                        dir.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    async fn write_contents(
        &self,
        name: &str,
        description: Option<String>,
        root: &Path,
        files: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> CheckpointResult<Manifest> {
        let archive = self.archive_path(name);
        let root = root.to_path_buf();
        let (files, total_size) = tokio::task::spawn_blocking(move || {
            archive::write_archive(&root, &files, &archive).map(|size| (files, size))
        })
        .await??;

        let manifest = Manifest::new(name, description, timestamp, files, total_size);
        self.storage
            .write(&[SNAPSHOTS_DIR, name, MANIFEST_KEY], &manifest)
            .await?;

        Ok(manifest)
    }

    /// Load one snapshot's manifest.
    pub async fn get(&self, name: &str) -> CheckpointResult<Option<Manifest>> {
        Ok(self.storage.read(&[SNAPSHOTS_DIR, name, MANIFEST_KEY]).await?)
    }

    /// All valid snapshots, newest first.
    pub async fn list(&self) -> CheckpointResult<Vec<Manifest>> {
        let mut entries = match fs::read_dir(&self.snapshots_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut manifests = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 snapshot directory {:?}", entry.path());
                continue;
            };
            match self.get(&name).await {
                Ok(Some(manifest)) => manifests.push(manifest),
                Ok(None) => warn!("Skipping {}: no manifest", entry.path().display()),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        manifests.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(manifests)
    }

    /// Delete snapshots beyond the newest `max`. Returns the deleted names.
    pub async fn enforce_retention(&self, max: usize) -> CheckpointResult<Vec<String>> {
        let snapshots = self.list().await?;
        let mut deleted = Vec::new();

        for manifest in snapshots.iter().skip(max.max(1)) {
            match self.delete(&manifest.name).await {
                Ok(()) => deleted.push(manifest.name.clone()),
                Err(e) => warn!("Failed to delete old checkpoint {}: {}", manifest.name, e),
            }
        }

        if !deleted.is_empty() {
            info!("Removed {} old checkpoint(s)", deleted.len());
        }
        Ok(deleted)
    }

    /// Delete a snapshot directory.
    pub async fn delete(&self, name: &str) -> CheckpointResult<()> {
        fs::remove_dir_all(self.snapshot_dir(name)).await?;
        debug!("Deleted checkpoint {}", name);
        Ok(())
    }

    /// Find a snapshot by exact name, then by substring, newest first.
    pub async fn resolve(&self, identifier: &str) -> CheckpointResult<Manifest> {
        let snapshots = self.list().await?;

        let position = snapshots
            .iter()
            .position(|m| m.name == identifier)
            .or_else(|| snapshots.iter().position(|m| m.name.contains(identifier)));

        match position {
            Some(i) => {
                let mut snapshots = snapshots;
                Ok(snapshots.swap_remove(i))
            }
            None => {
                let candidates = snapshots
                    .into_iter()
                    .take(MAX_CANDIDATES)
                    .map(|m| m.name)
                    .collect();
                Err(CheckpointError::not_found(identifier, candidates))
            }
        }
    }
}

/// Human-readable byte size with one decimal: `512.0B`, `1.5KB`, `1024.0GB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1}{}", size, UNITS[unit])
}
