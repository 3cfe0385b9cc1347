//! Per-project checkpoint configuration.
//!
//! Stored as `config.json` in the checkpoint root. Loading never fails: a
//! missing or malformed document is replaced with the defaults.

use crate::CheckpointResult;
use rewind_storage::{JsonStorage, Storage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CONFIG_KEY: &[&str] = &["config"];

/// Default number of snapshots kept by retention.
pub const DEFAULT_MAX_CHECKPOINTS: usize = 10;

/// Default name template for unnamed checkpoints.
pub const DEFAULT_NAME_TEMPLATE: &str = "checkpoint_{timestamp}";

/// Checkpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Snapshots kept after each create. Always at least 1.
    pub max_checkpoints: usize,
    /// Derive checkpoint names from the description when no name is given.
    pub auto_name: bool,
    /// Extra gitignore-syntax rules, applied after the project's ignore file.
    pub additional_ignores: Vec<String>,
    /// Template for unnamed checkpoints; the text before `{timestamp}` is the
    /// name prefix.
    pub name_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_checkpoints: DEFAULT_MAX_CHECKPOINTS,
            auto_name: true,
            additional_ignores: Vec::new(),
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
        }
    }
}

/// Fields present in a stored config document.
///
/// Absent fields keep their default when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub max_checkpoints: Option<usize>,
    pub auto_name: Option<bool>,
    pub additional_ignores: Option<Vec<String>>,
    pub name_template: Option<String>,
}

impl Config {
    /// Apply stored overrides on top of this config.
    pub fn merged(self, overrides: ConfigOverrides) -> Self {
        let max_checkpoints = overrides
            .max_checkpoints
            .unwrap_or(self.max_checkpoints)
            .max(1);

        Self {
            max_checkpoints,
            auto_name: overrides.auto_name.unwrap_or(self.auto_name),
            additional_ignores: overrides
                .additional_ignores
                .unwrap_or(self.additional_ignores),
            name_template: overrides.name_template.unwrap_or(self.name_template),
        }
    }
}

/// Reads and writes `config.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    storage: JsonStorage,
}

impl ConfigStore {
    /// Create a store over the checkpoint root's storage.
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }

    /// Load the config, persisting defaults when the document is missing or
    /// unparseable.
    pub async fn load(&self) -> Config {
        match self.storage.read::<ConfigOverrides>(CONFIG_KEY).await {
            Ok(Some(overrides)) => Config::default().merged(overrides),
            Ok(None) => {
                debug!("No checkpoint config found, writing defaults");
                self.reset().await
            }
            Err(e) => {
                warn!(error = %e, "Invalid checkpoint config, resetting to defaults");
                self.reset().await
            }
        }
    }

    /// Persist a config.
    pub async fn save(&self, config: &Config) -> CheckpointResult<()> {
        self.storage.write(CONFIG_KEY, config).await?;
        Ok(())
    }

    /// Whether a config document exists on disk.
    pub async fn exists(&self) -> bool {
        self.storage.exists(CONFIG_KEY).await.unwrap_or(false)
    }

    async fn reset(&self) -> Config {
        let config = Config::default();
        if let Err(e) = self.save(&config).await {
            warn!(error = %e, "Failed to write default checkpoint config");
        }
        config
    }
}
