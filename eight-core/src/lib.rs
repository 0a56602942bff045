//! eightctl Core Library
//!
//! Shared types, wire models, and errors for the eightctl client.
//! The CLI crate builds on these; nothing here performs I/O.

pub mod api;
pub mod error;
pub mod paths;
pub mod types;

// Re-export commonly used types
pub use api::{OutputRow, SchedulePatch};
pub use error::*;
pub use paths::default_config_path;
pub use types::*;
