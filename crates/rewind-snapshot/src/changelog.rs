//! Bounded activity log.
//!
//! Stored as `changelog.json`, newest entry first. Writes are best effort:
//! a failure to record activity never fails the operation being recorded.

use crate::CheckpointResult;
use chrono::{DateTime, Utc};
use rewind_storage::{JsonStorage, Storage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CHANGELOG_KEY: &[&str] = &["changelog"];

/// Entries kept in the log.
pub const MAX_CHANGELOG_ENTRIES: usize = 50;

/// Action recorded when a checkpoint is created.
pub const ACTION_CREATE: &str = "CREATE_CHECKPOINT";
/// Action recorded when a checkpoint is restored.
pub const ACTION_RESTORE: &str = "RESTORE_CHECKPOINT";
/// Action recorded by setup.
pub const ACTION_SETUP: &str = "SETUP";
/// Default action for externally logged entries.
pub const ACTION_CODE_CHANGE: &str = "CODE_CHANGE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ChangelogEntry {
    pub fn new(
        action: impl Into<String>,
        description: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            description: description.into(),
            details,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Changelog {
    storage: JsonStorage,
}

impl Changelog {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }

    /// All entries, newest first. Missing or unreadable logs are empty.
    pub async fn entries(&self) -> Vec<ChangelogEntry> {
        match self.storage.read::<Vec<ChangelogEntry>>(CHANGELOG_KEY).await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                debug!("Ignoring unreadable changelog: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend an entry, keeping the newest [`MAX_CHANGELOG_ENTRIES`].
    pub async fn append(&self, action: &str, description: &str, details: Option<String>) {
        let entry = ChangelogEntry::new(action, description, details);
        if let Err(e) = self.try_append(entry).await {
            warn!("Failed to update changelog: {}", e);
        }
    }

    async fn try_append(&self, entry: ChangelogEntry) -> CheckpointResult<()> {
        let mut entries = self.entries().await;
        entries.insert(0, entry);
        entries.truncate(MAX_CHANGELOG_ENTRIES);
        self.storage.write(CHANGELOG_KEY, &entries).await?;
        Ok(())
    }
}
