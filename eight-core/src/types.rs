//! Core types and data structures for eightctl

use serde::{Deserialize, Serialize};

/// Highest day-of-week index (0 = Sunday .. 6 = Saturday)
pub const MAX_DAY_OF_WEEK: u8 = 6;

/// Server-side field names for schedule attributes.
///
/// Used both by the serde representation of [`TemperatureSchedule`] and by
/// [`crate::SchedulePatch`], so a patch never drifts from the full record.
pub mod fields {
    pub const ID: &str = "id";
    pub const START_TIME: &str = "startTime";
    pub const LEVEL: &str = "level";
    pub const DAYS_OF_WEEK: &str = "daysOfWeek";
    pub const ENABLED: &str = "enabled";
}

/// A recurring temperature-control rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSchedule {
    /// Server-assigned identifier, absent until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Start time as "HH:MM"
    pub start_time: String,
    /// Temperature level, nominally -100..=100
    pub level: i32,
    /// Active days, 0 = Sunday .. 6 = Saturday
    pub days_of_week: Vec<u8>,
    /// Whether the schedule is active
    pub enabled: bool,
}

impl TemperatureSchedule {
    /// Create a new, not yet persisted schedule
    pub fn new(
        start_time: impl Into<String>,
        level: i32,
        days_of_week: Vec<u8>,
        enabled: bool,
    ) -> Self {
        Self {
            id: None,
            start_time: start_time.into(),
            level,
            days_of_week,
            enabled,
        }
    }

    /// Check the creation invariants: a start time and at least one day.
    ///
    /// Only an empty start time is rejected. Its format and the level range
    /// are left to the service.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_time.is_empty() {
            return Err("--start HH:MM required".to_string());
        }
        if self.days_of_week.is_empty() {
            return Err("--days required".to_string());
        }
        Ok(())
    }

    /// Identifier as a display string (empty when not yet assigned)
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}
