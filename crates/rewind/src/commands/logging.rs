//! Logging initialization.
//!
//! Interactive commands log to stderr. The MCP server owns stdout for
//! JSON-RPC, so it logs to a file in the platform state directory.

use rewind_util::log::{self, LogConfig, LogLevel, LogTarget};
use std::path::PathBuf;

/// Initialize logging for the chosen command.
/// Returns the log file path if logging to file.
pub fn init_logging(verbose: bool, serving: bool) -> Option<PathBuf> {
    let level = if verbose {
        LogLevel::Debug
    } else if serving {
        LogLevel::Info
    } else {
        LogLevel::Warn
    };

    let target = if serving {
        LogTarget::File(log::default_log_path())
    } else {
        LogTarget::Stderr
    };

    log::init(LogConfig {
        level,
        include_location: verbose,
        target,
    })
}
