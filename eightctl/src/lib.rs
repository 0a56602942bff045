//! eightctl library
//!
//! This library provides the core functionality for the `eightctl` CLI tool.
//!
//! # Public API
//!
//! The primary public API is [`client::EightClient`], which implements the
//! [`client::EightApi`] and [`client::TravelApi`] traits against the remote
//! service. Configuration types are available via [`config::CliConfig`] and
//! [`config::ConfigBuilder`].
//!
//! ```no_run
//! use eightctl::client::{ClientOptions, EightApi, EightClient};
//! use eightctl::config::CliConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CliConfig::builder().with_env_overrides().build()?;
//! let client = EightClient::new(config.credentials()?, ClientOptions::from_config(&config))?;
//!
//! for schedule in client.list_schedules().await? {
//!     println!("{} {}", schedule.id_str(), schedule.start_time);
//! }
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the schedule and travel services.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
