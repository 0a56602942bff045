//! API models for the remote schedule and travel service
//!
//! Request and response shapes exchanged with the service, plus the generic
//! row type handed to the output renderer.

use crate::types::{fields, TemperatureSchedule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One rendered row: column name to dynamically-typed value
pub type OutputRow = Map<String, Value>;

/// Partial schedule update.
///
/// Holds only the fields the caller explicitly set, keyed by their server-side
/// names. Anything absent is left untouched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchedulePatch(Map<String, Value>);

impl SchedulePatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start time ("HH:MM")
    pub fn set_start_time(&mut self, start: impl Into<String>) -> &mut Self {
        self.0
            .insert(fields::START_TIME.to_string(), Value::String(start.into()));
        self
    }

    /// Set the temperature level
    pub fn set_level(&mut self, level: i32) -> &mut Self {
        self.0.insert(fields::LEVEL.to_string(), Value::from(level));
        self
    }

    /// Set the active days
    pub fn set_days_of_week(&mut self, days: Vec<u8>) -> &mut Self {
        self.0
            .insert(fields::DAYS_OF_WEEK.to_string(), Value::from(days));
        self
    }

    /// Set the enabled flag
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.0
            .insert(fields::ENABLED.to_string(), Value::Bool(enabled));
        self
    }

    /// Whether no field has been set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Value of a field by its server-side name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Server-side names of the fields set
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Schedule listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    /// All schedules for the account
    #[serde(default)]
    pub schedules: Vec<TemperatureSchedule>,
}

/// Password-grant token request
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Token response from the auth service
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent calls
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Account user id as known to the service
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}
