//! CLI command definitions and handlers
//!
//! This module organizes the CLI into logical submodules:
//! - [`commands`] - Command and subcommand enum definitions
//! - [`requests`] - Validation of parsed commands into requests
//! - [`handlers`] - Command execution handlers

mod commands;
mod handlers;
mod requests;

pub use commands::*;
pub use handlers::*;
pub use requests::*;
