//! Shared utilities for rewind.
//!
//! This crate provides common utilities used across the rewind workspace:
//! - Logging setup with tracing
//! - Path utilities for project-relative, forward-slash paths

pub mod log;
pub mod path;

pub use log::{LogConfig, LogLevel, LogTarget};
