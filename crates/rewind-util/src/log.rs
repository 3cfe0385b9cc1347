//! Logging setup using tracing.
//!
//! This module provides consistent logging configuration across rewind.
//! Interactive commands log to stderr; the MCP stdio server must keep stdout
//! clean, so it logs to a file instead.

use std::path::PathBuf;

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Write to stderr.
    #[default]
    Stderr,
    /// Append to the given file.
    File(PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level applied to the rewind crates.
    pub level: LogLevel,
    /// Whether to include file/line info in logs.
    pub include_location: bool,
    /// Output destination.
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            include_location: false,
            target: LogTarget::Stderr,
        }
    }
}

impl LogConfig {
    /// Build the `EnvFilter` directive string for this configuration.
    pub fn directives(&self) -> String {
        let level = self.level.as_str();
        format!("rewind={level},rewind_snapshot={level},rewind_storage={level},rewind_mcp={level}")
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Returns the log file
/// path when logging to a file. This should be called once at application
/// startup.
pub fn init(config: LogConfig) -> Option<PathBuf> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));

    match config.target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::io::stderr)
                .init();
            None
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Warning: Could not create log directory: {e}");
                    return None;
                }
            }

            let file = match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
            {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file: {e}");
                    return None;
                }
            };

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::sync::Mutex::new(file))
                .init();
            Some(path)
        }
    }
}

/// Get the default log file path.
///
/// Linux: `~/.local/state/rewind/logs/rewind.log`, falling back to the local
/// data directory on other platforms.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join("rewind").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".checkpoints/logs"))
        .join("rewind.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.target, LogTarget::Stderr);
    }

    #[test]
    fn test_directives_cover_workspace_crates() {
        let config = LogConfig {
            level: LogLevel::Debug,
            ..Default::default()
        };
        let directives = config.directives();
        assert!(directives.contains("rewind=debug"));
        assert!(directives.contains("rewind_snapshot=debug"));
    }

    #[test]
    fn test_default_log_path_file_name() {
        assert!(default_log_path().ends_with("rewind.log"));
    }
}
