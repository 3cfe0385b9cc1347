//! Command handlers for the rewind CLI.

pub mod checkpoint;
pub mod logging;
pub mod serve;

pub use checkpoint::*;
pub use logging::*;
pub use serve::*;
