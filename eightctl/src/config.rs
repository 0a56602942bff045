//! CLI configuration management
//!
//! Handles loading and saving CLI configuration and enforcing the
//! credential precondition before any client is built.

use anyhow::{Context, Result};
use eight_core::EightError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const ENV_EMAIL: &str = "EIGHTCTL_EMAIL";
const ENV_PASSWORD: &str = "EIGHTCTL_PASSWORD";
const ENV_USER_ID: &str = "EIGHTCTL_USER_ID";
const ENV_CLIENT_ID: &str = "EIGHTCTL_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "EIGHTCTL_CLIENT_SECRET";
const ENV_OUTPUT: &str = "EIGHTCTL_OUTPUT";
const ENV_VERBOSE: &str = "EIGHTCTL_VERBOSE";
const ENV_TIMEOUT: &str = "EIGHTCTL_TIMEOUT";
const ENV_API_URL: &str = "EIGHTCTL_API_URL";
const ENV_AUTH_URL: &str = "EIGHTCTL_AUTH_URL";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Account email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Account password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Account user id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// OAuth client id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Base URL of the schedule/travel API
    pub api_url: String,

    /// Base URL of the token service
    pub auth_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            user_id: None,
            client_id: None,
            client_secret: None,
            output_format: "table".to_string(),
            verbose: false,
            timeout: 10,
            api_url: "https://client-api.8slp.net".to_string(),
            auth_url: "https://auth-api.8slp.net".to_string(),
        }
    }
}

/// The five values an authenticated client is built from
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub user_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from `path`, or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path);

        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read CLI config file")?;

            toml::from_str(&content).context("Failed to parse CLI config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, or the default location
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = Self::resolve_path(path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;

        std::fs::write(&config_path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(eight_core::default_config_path)
    }

    /// Return the credentials, or a configuration error naming every missing field.
    ///
    /// Blank values count as missing; present values are returned untouched.
    pub fn credentials(&self) -> std::result::Result<Credentials, EightError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.clone().filter(|v| !v.trim().is_empty())
        }

        let email = present(&self.email);
        let password = present(&self.password);
        let user_id = present(&self.user_id);
        let client_id = present(&self.client_id);
        let client_secret = present(&self.client_secret);

        match (email, password, user_id, client_id, client_secret) {
            (Some(email), Some(password), Some(user_id), Some(client_id), Some(client_secret)) => {
                Ok(Credentials {
                    email,
                    password,
                    user_id,
                    client_id,
                    client_secret,
                })
            }
            (email, password, user_id, client_id, client_secret) => {
                let missing: Vec<&str> = [
                    ("email", email.is_none()),
                    ("password", password.is_none()),
                    ("user_id", user_id.is_none()),
                    ("client_id", client_id.is_none()),
                    ("client_secret", client_secret.is_none()),
                ]
                .iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| *name)
                .collect();

                Err(EightError::config(format!(
                    "missing required auth fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        Self {
            password: mask(&self.password),
            client_secret: mask(&self.client_secret),
            ..self.clone()
        }
    }

    /// Set one key from its string form, validating it
    pub fn set_key(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "email" => self.email = Some(value),
            "password" => self.password = Some(value),
            "user_id" => self.user_id = Some(value),
            "client_id" => self.client_id = Some(value),
            "client_secret" => self.client_secret = Some(value),
            "output_format" | "output" => {
                ConfigBuilder::validate_output_format(&value)?;
                self.output_format = value;
            }
            "verbose" => self.verbose = parse_bool(&value),
            "timeout" => {
                let timeout = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid timeout value. Must be a number"))?;
                ConfigBuilder::validate_timeout(timeout)?;
                self.timeout = timeout;
            }
            "api_url" => {
                ConfigBuilder::validate_url(&value)?;
                self.api_url = value;
            }
            "auth_url" => {
                ConfigBuilder::validate_url(&value)?;
                self.auth_url = value;
            }
            _ => return Err(anyhow::anyhow!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

fn parse_bool(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Layers are applied highest first; each layer only fills values that are
/// still unset.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    email: Option<String>,
    password: Option<String>,
    user_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    timeout: Option<u64>,
    api_url: Option<String>,
    auth_url: Option<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email.or(self.email);
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.or(self.password);
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id.or(self.user_id);
        self
    }

    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id.or(self.client_id);
        self
    }

    pub fn with_client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret.or(self.client_secret);
        self
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Set API base URL (with validation)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.api_url = Some(url);
        Ok(self)
    }

    /// Set token service base URL (with validation)
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.auth_url = Some(url);
        Ok(self)
    }

    /// Load configuration from file
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn with_config_file(self, load_file: bool, path: Option<&Path>) -> Result<Self> {
        if !load_file {
            return Ok(self);
        }

        let config = CliConfig::load(path)?;
        Ok(Self {
            email: self.email.or(config.email),
            password: self.password.or(config.password),
            user_id: self.user_id.or(config.user_id),
            client_id: self.client_id.or(config.client_id),
            client_secret: self.client_secret.or(config.client_secret),
            output_format: self.output_format.or(Some(config.output_format)),
            verbose: self.verbose.or(Some(config.verbose)),
            timeout: self.timeout.or(Some(config.timeout)),
            api_url: self.api_url.or(Some(config.api_url)),
            auth_url: self.auth_url.or(Some(config.auth_url)),
        })
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        fn env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        }

        // Only apply env vars if values weren't already set (preserving priority)
        self.email = self.email.or_else(|| env(ENV_EMAIL));
        self.password = self.password.or_else(|| env(ENV_PASSWORD));
        self.user_id = self.user_id.or_else(|| env(ENV_USER_ID));
        self.client_id = self.client_id.or_else(|| env(ENV_CLIENT_ID));
        self.client_secret = self.client_secret.or_else(|| env(ENV_CLIENT_SECRET));

        if self.output_format.is_none() {
            self.output_format =
                env(ENV_OUTPUT).filter(|f| Self::validate_output_format(f).is_ok());
        }

        if self.verbose.is_none() {
            self.verbose = env(ENV_VERBOSE).map(|v| parse_bool(&v));
        }

        if self.timeout.is_none() {
            self.timeout = env(ENV_TIMEOUT)
                .and_then(|t| t.parse().ok())
                .filter(|t| Self::validate_timeout(*t).is_ok());
        }

        if self.api_url.is_none() {
            self.api_url = env(ENV_API_URL).filter(|u| Self::validate_url(u).is_ok());
        }

        if self.auth_url.is_none() {
            self.auth_url = env(ENV_AUTH_URL).filter(|u| Self::validate_url(u).is_ok());
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);
        let api_url = self.api_url.unwrap_or(defaults.api_url);
        let auth_url = self.auth_url.unwrap_or(defaults.auth_url);

        // Validate final values
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;
        Self::validate_url(&api_url)?;
        Self::validate_url(&auth_url)?;

        Ok(CliConfig {
            email: self.email,
            password: self.password,
            user_id: self.user_id,
            client_id: self.client_id,
            client_secret: self.client_secret,
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout,
            api_url,
            auth_url,
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!("URL must start with http:// or https://"));
        }

        Ok(())
    }

    /// Validate output format
    fn validate_output_format(format: &str) -> Result<()> {
        crate::format::OutputFormat::from_name(format).map(|_| ())
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }
}
