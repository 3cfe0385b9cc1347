//! Checkpoint session for one project.

use crate::changelog::{ACTION_CREATE, ACTION_SETUP};
use crate::matcher::compose_rules;
use crate::naming;
use crate::store::format_size;
use crate::{
    files, Changelog, ChangelogEntry, CheckpointError, CheckpointResult, Config, ConfigStore,
    IgnoreMatcher, Manifest, SnapshotStore,
};
use chrono::Utc;
use rewind_storage::JsonStorage;
use rewind_util::path::relative_slash;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Checkpoint root, relative to the project root.
pub const CHECKPOINT_DIR: &str = ".checkpoints";

/// Project ignore file read for rules and extended by setup.
pub const IGNORE_FILE: &str = ".gitignore";

/// Name of the snapshot taken before every restore.
pub const EMERGENCY_BACKUP_PREFIX: &str = "emergency_backup";

/// Name of the snapshot taken by setup.
pub const INITIAL_CHECKPOINT_NAME: &str = "initial";

/// Header written above the checkpoint entry in the ignore file.
pub const IGNORE_FILE_HEADER: &str = "# rewind checkpoint system";

const MAX_NAME_ATTEMPTS: u32 = 99;

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCheckpoint {
    pub name: String,
    pub file_count: usize,
    /// Formatted total size, e.g. `1.5KB`.
    pub size: String,
    pub total_size: u64,
    pub description: Option<String>,
}

impl From<&Manifest> for CreatedCheckpoint {
    fn from(manifest: &Manifest) -> Self {
        Self {
            name: manifest.name.clone(),
            file_count: manifest.file_count,
            size: format_size(manifest.total_size),
            total_size: manifest.total_size,
            description: manifest.description.clone(),
        }
    }
}

/// Result of setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Name of the initial snapshot, when one was created.
    pub initial_checkpoint: Option<String>,
    pub config_created: bool,
    pub ignore_file_updated: bool,
}

/// A checkpoint session bound to one project root.
///
/// The compiled ignore matcher is cached for the lifetime of the session;
/// call [`CheckpointManager::invalidate_matcher`] after changing ignore rules.
pub struct CheckpointManager {
    pub(crate) project_root: PathBuf,
    pub(crate) checkpoint_dir: PathBuf,
    config_store: ConfigStore,
    pub(crate) store: SnapshotStore,
    pub(crate) changelog: Changelog,
    matcher: Mutex<Option<Arc<IgnoreMatcher>>>,
}

impl CheckpointManager {
    /// Create a session for `project_root`. Nothing is touched on disk.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let checkpoint_dir = project_root.join(CHECKPOINT_DIR);
        let storage = JsonStorage::new(&checkpoint_dir);

        Self {
            config_store: ConfigStore::new(storage.clone()),
            store: SnapshotStore::new(storage.clone()),
            changelog: Changelog::new(storage),
            project_root,
            checkpoint_dir,
            matcher: Mutex::new(None),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    pub fn snapshots_dir(&self) -> &Path {
        self.store.snapshots_dir()
    }

    pub fn config_path(&self) -> PathBuf {
        self.checkpoint_dir.join("config.json")
    }

    pub fn changelog_path(&self) -> PathBuf {
        self.checkpoint_dir.join("changelog.json")
    }

    /// Create the checkpoint root and snapshot directory. Idempotent.
    pub async fn ensure_directories(&self) -> CheckpointResult<()> {
        match fs::metadata(&self.project_root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(CheckpointError::InvalidProjectRoot(
                    self.project_root.display().to_string(),
                ))
            }
        }

        fs::create_dir_all(self.store.snapshots_dir()).await?;
        Ok(())
    }

    /// Load the project config, creating it with defaults if needed.
    pub async fn load_config(&self) -> Config {
        self.config_store.load().await
    }

    /// Persist a new project config and drop the cached matcher.
    pub async fn save_config(&self, config: &Config) -> CheckpointResult<()> {
        self.ensure_directories().await?;
        self.config_store.save(config).await?;
        self.invalidate_matcher().await;
        Ok(())
    }

    /// The session's compiled ignore matcher, built on first use.
    pub async fn ignore_matcher(&self) -> CheckpointResult<Arc<IgnoreMatcher>> {
        let mut cached = self.matcher.lock().await;
        if let Some(matcher) = cached.as_ref() {
            return Ok(Arc::clone(matcher));
        }

        let config = self.load_config().await;
        let ignore_path = self.project_root.join(IGNORE_FILE);
        let ignore_file = match fs::read_to_string(&ignore_path).await {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read {}: {}", ignore_path.display(), e);
                None
            }
        };

        let rules = compose_rules(
            ignore_file.as_deref(),
            &config.additional_ignores,
            CHECKPOINT_DIR,
        );
        let matcher = Arc::new(IgnoreMatcher::compile(&self.project_root, rules)?);
        *cached = Some(Arc::clone(&matcher));
        Ok(matcher)
    }

    /// Drop the cached matcher so the next query re-reads the rules.
    pub async fn invalidate_matcher(&self) {
        *self.matcher.lock().await = None;
    }

    /// Whether `path` (absolute under the project root, or relative) is
    /// excluded from snapshots. Paths outside the project are not ignored.
    pub async fn should_ignore(&self, path: &Path) -> CheckpointResult<bool> {
        let Some(relative) = relative_slash(path, &self.project_root) else {
            return Ok(false);
        };
        let is_dir = fs::metadata(self.project_root.join(&relative))
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        Ok(self.ignore_matcher().await?.is_ignored(&relative, is_dir))
    }

    /// Every file a snapshot would capture, sorted.
    pub async fn get_project_files(&self) -> CheckpointResult<Vec<String>> {
        let matcher = self.ignore_matcher().await?;
        let root = self.project_root.clone();
        let files = tokio::task::spawn_blocking(move || files::enumerate(&root, &matcher)).await??;
        Ok(files)
    }

    /// Snapshot the current project tree.
    pub async fn create(
        &self,
        name: Option<&str>,
        description: Option<&str>,
    ) -> CheckpointResult<CreatedCheckpoint> {
        self.ensure_directories().await?;
        let config = self.load_config().await;

        let files = self.get_project_files().await?;
        if files.is_empty() {
            return Err(CheckpointError::NoFilesFound);
        }

        let now = Utc::now();
        let base = naming::checkpoint_name(name, description, &config, now);
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let mut attempt = 1;
        let manifest = loop {
            let candidate = naming::with_counter(&base, attempt);
            match self
                .store
                .write(
                    &candidate,
                    description.clone(),
                    &self.project_root,
                    files.clone(),
                    now,
                )
                .await
            {
                Err(CheckpointError::AlreadyExists(existing)) if attempt < MAX_NAME_ATTEMPTS => {
                    debug!("Checkpoint name {} taken, retrying", existing);
                    attempt += 1;
                }
                result => break result?,
            }
        };

        if let Err(e) = self.store.enforce_retention(config.max_checkpoints).await {
            warn!("Checkpoint retention failed: {}", e);
        }

        self.changelog
            .append(
                ACTION_CREATE,
                &format!("Created checkpoint: {}", manifest.name),
                Some(manifest.display_description().to_string()),
            )
            .await;

        Ok(CreatedCheckpoint::from(&manifest))
    }

    /// All valid snapshots, newest first.
    pub async fn get_checkpoints(&self) -> CheckpointResult<Vec<Manifest>> {
        self.store.list().await
    }

    /// Remove empty directories from the project tree.
    pub async fn cleanup_empty_directories(&self) -> CheckpointResult<usize> {
        let matcher = self.ignore_matcher().await?;
        let root = self.project_root.clone();
        let protected = self.checkpoint_dir.clone();
        let removed = tokio::task::spawn_blocking(move || {
            files::cleanup_empty_directories(&root, &matcher, &protected)
        })
        .await?;
        Ok(removed)
    }

    /// The activity log, newest first.
    pub async fn get_changelog(&self) -> Vec<ChangelogEntry> {
        self.changelog.entries().await
    }

    /// Record an activity. Never fails.
    pub async fn log_to_changelog(&self, action: &str, description: &str, details: Option<&str>) {
        self.changelog
            .append(action, description, details.map(str::to_string))
            .await;
    }

    /// Initialize checkpointing for the project.
    pub async fn setup(&self) -> CheckpointResult<SetupReport> {
        self.ensure_directories().await?;

        let config_created = !self.config_store.exists().await;
        self.load_config().await;

        let ignore_file_updated = match self.ensure_ignore_entry().await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Could not update {}: {}", IGNORE_FILE, e);
                false
            }
        };
        self.invalidate_matcher().await;

        let initial_checkpoint = if self.store.list().await?.is_empty() {
            match self
                .create(Some(INITIAL_CHECKPOINT_NAME), Some("Initial checkpoint"))
                .await
            {
                Ok(created) => Some(created.name),
                Err(CheckpointError::NoFilesFound) => {
                    debug!("No files to capture for the initial checkpoint");
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        self.changelog
            .append(ACTION_SETUP, "Checkpoint system initialized", None)
            .await;
        info!("Checkpoint system ready in {}", self.project_root.display());

        Ok(SetupReport {
            initial_checkpoint,
            config_created,
            ignore_file_updated,
        })
    }

    /// Append the checkpoint directory to the ignore file unless present.
    async fn ensure_ignore_entry(&self) -> std::io::Result<bool> {
        let path = self.project_root.join(IGNORE_FILE);
        let existing = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let entry = format!("{}/", CHECKPOINT_DIR);
        if existing
            .lines()
            .map(str::trim)
            .any(|line| line == entry || line == CHECKPOINT_DIR)
        {
            return Ok(false);
        }

        let mut updated = existing;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        if !updated.is_empty() {
            updated.push('\n');
        }
        updated.push_str(IGNORE_FILE_HEADER);
        updated.push('\n');
        updated.push_str(&entry);
        updated.push('\n');

        fs::write(&path, updated).await?;
        debug!("Added {} to {}", entry, path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_paths() {
        let manager = CheckpointManager::new("/project");
        assert_eq!(manager.checkpoint_dir(), Path::new("/project/.checkpoints"));
        assert_eq!(
            manager.snapshots_dir(),
            Path::new("/project/.checkpoints/snapshots")
        );
        assert_eq!(
            manager.config_path(),
            PathBuf::from("/project/.checkpoints/config.json")
        );
        assert_eq!(
            manager.changelog_path(),
            PathBuf::from("/project/.checkpoints/changelog.json")
        );
    }

    #[tokio::test]
    async fn test_ensure_directories_idempotent() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        manager.ensure_directories().await.unwrap();
        manager.ensure_directories().await.unwrap();
        assert!(manager.snapshots_dir().is_dir());
    }

    #[tokio::test]
    async fn test_ensure_directories_missing_root() {
        let dir = tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("missing"));

        let err = manager.ensure_directories().await.unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidProjectRoot(_)));
    }

    #[tokio::test]
    async fn test_matcher_is_cached_until_invalidated() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("debug.log"), "log").unwrap();
        let manager = CheckpointManager::new(dir.path());

        assert!(!manager.should_ignore(Path::new("debug.log")).await.unwrap());

        std::fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        assert!(!manager.should_ignore(Path::new("debug.log")).await.unwrap());

        manager.invalidate_matcher().await;
        assert!(manager.should_ignore(Path::new("debug.log")).await.unwrap());
        assert!(manager
            .should_ignore(&dir.path().join("debug.log"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ensure_ignore_entry_once() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "node_modules/").unwrap();
        let manager = CheckpointManager::new(dir.path());

        assert!(manager.ensure_ignore_entry().await.unwrap());
        assert!(!manager.ensure_ignore_entry().await.unwrap());

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(
            content,
            "node_modules/\n\n# rewind checkpoint system\n.checkpoints/\n"
        );
    }
}
