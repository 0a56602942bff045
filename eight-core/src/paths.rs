//! Default path resolution for configuration files
//!
//! Uses the XDG config directory when available, else the working directory.

use std::path::PathBuf;

/// Returns the default path for the CLI configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/eightctl/config.toml`
/// - Fallback: `./eightctl/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eightctl")
        .join("config.toml")
}
