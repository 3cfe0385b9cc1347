//! Restoring a project tree from a snapshot.
//!
//! A real restore proceeds in phases, and nothing in the project tree is
//! touched until the first two succeed:
//!
//! 1. unpack the archive into a staging directory inside the checkpoint root
//! 2. take an emergency backup of the current tree
//! 3. copy the staged files over the project
//! 4. delete current files the snapshot does not contain
//! 5. prune empty directories
//!
//! Phase 4 uses the same ignore matcher as the emergency backup, so every
//! deleted file is recoverable from that backup.

use crate::archive::unpack_archive;
use crate::changelog::ACTION_RESTORE;
use crate::manager::EMERGENCY_BACKUP_PREFIX;
use crate::{files, CheckpointError, CheckpointManager, CheckpointResult, IgnoreMatcher, Manifest};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// What a dry run would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePreview {
    pub checkpoint: Manifest,
    /// Current files absent from the snapshot.
    pub files_to_delete: Vec<String>,
}

/// What a real restore did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredCheckpoint {
    /// `None` when the tree was empty and there was nothing to back up.
    pub emergency_backup: Option<String>,
    /// Name of the restored snapshot.
    pub restored: String,
    pub file_count: usize,
    pub files_deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Preview(RestorePreview),
    Restored(RestoredCheckpoint),
}

impl CheckpointManager {
    /// Restore the snapshot matching `identifier`.
    ///
    /// The identifier is matched exactly first, then as a substring, against
    /// snapshots newest first. With `dry_run` nothing is changed.
    pub async fn restore(&self, identifier: &str, dry_run: bool) -> CheckpointResult<RestoreOutcome> {
        let target = self.store.resolve(identifier).await?;

        if dry_run {
            let files_to_delete = self
                .get_project_files()
                .await?
                .into_iter()
                .filter(|f| !target.contains_file(f))
                .collect();
            return Ok(RestoreOutcome::Preview(RestorePreview {
                checkpoint: target,
                files_to_delete,
            }));
        }

        self.ensure_directories().await?;
        let staging = tempfile::Builder::new()
            .prefix(".restore-")
            .tempdir_in(&self.checkpoint_dir)?;

        let archive = self.store.archive_path(&target.name);
        let staged = staging.path().to_path_buf();
        let expected = target.files.clone();
        tokio::task::spawn_blocking(move || unpack_archive(&archive, &staged, &expected)).await??;
        debug!("Staged checkpoint {} in {}", target.name, staging.path().display());

        let emergency_backup = match self
            .create(
                Some(EMERGENCY_BACKUP_PREFIX),
                Some(&format!("Before restoring {}", target.name)),
            )
            .await
        {
            Ok(created) => Some(created.name),
            Err(CheckpointError::NoFilesFound) => None,
            Err(e) => return Err(e),
        };

        let matcher = self.ignore_matcher().await?;
        let root = self.project_root.clone();
        let checkpoint_dir = self.checkpoint_dir.clone();
        let staged = staging.path().to_path_buf();
        let files = target.files.clone();
        let files_deleted = tokio::task::spawn_blocking(move || {
            apply_snapshot(&staged, &root, &files, &matcher, &checkpoint_dir)
        })
        .await??;
        drop(staging);

        self.invalidate_matcher().await;

        info!(
            "Restored checkpoint {} ({} files, {} deleted)",
            target.name, target.file_count, files_deleted
        );
        self.changelog
            .append(
                ACTION_RESTORE,
                &format!("Restored checkpoint: {}", target.name),
                emergency_backup
                    .as_ref()
                    .map(|backup| format!("Emergency backup: {}", backup)),
            )
            .await;

        Ok(RestoreOutcome::Restored(RestoredCheckpoint {
            emergency_backup,
            restored: target.name,
            file_count: target.file_count,
            files_deleted,
        }))
    }
}

/// Copy staged files over `root`, delete files not in `files`, then prune
/// empty directories. Returns the number of files deleted.
fn apply_snapshot(
    staged: &Path,
    root: &Path,
    files: &[String],
    matcher: &Arc<IgnoreMatcher>,
    checkpoint_dir: &Path,
) -> io::Result<usize> {
    for relative in files {
        let dest = root.join(relative);
        clear_path_for(root, &dest)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(staged.join(relative), &dest)?;
        debug!("Restored {}", relative);
    }

    let mut deleted = 0;
    let kept: HashSet<&str> = files.iter().map(String::as_str).collect();
    for relative in files::enumerate(root, matcher)? {
        if kept.contains(relative.as_str()) {
            continue;
        }
        std::fs::remove_file(root.join(&relative))?;
        debug!("Deleted {}", relative);
        deleted += 1;
    }

    files::cleanup_empty_directories(root, matcher, checkpoint_dir);
    Ok(deleted)
}

/// Remove whatever occupies `dest` or its ancestors that would keep a regular
/// file from being written there: a directory or symlink at `dest`, or a
/// non-directory where a parent directory is needed.
fn clear_path_for(root: &Path, dest: &Path) -> io::Result<()> {
    let Ok(relative) = dest.strip_prefix(root) else {
        return Ok(());
    };

    let mut current = root.to_path_buf();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        current.push(component);
        let Ok(meta) = std::fs::symlink_metadata(&current) else {
            // Nothing further down can exist either.
            return Ok(());
        };
        let is_last = components.peek().is_none();
        if is_last {
            if meta.is_dir() {
                std::fs::remove_dir_all(&current)?;
            } else if meta.file_type().is_symlink() {
                std::fs::remove_file(&current)?;
            }
        } else if !meta.is_dir() {
            std::fs::remove_file(&current)?;
            return Ok(());
        }
    }
    Ok(())
}
