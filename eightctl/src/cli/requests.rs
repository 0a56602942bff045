//! Request construction from parsed commands
//!
//! Everything here is pure: input is validated and turned into the exact
//! request to send, before credentials are checked or a client exists.

use anyhow::Result;
use eight_core::{EightError, SchedulePatch, TemperatureSchedule};

use super::commands::{ScheduleCommands, TravelCommands};

/// Columns of `schedule list`, in display order
pub const SCHEDULE_COLUMNS: [&str; 5] = ["id", "start", "level", "days", "enabled"];

/// A validated schedule operation
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleAction {
    List { fields: Vec<String> },
    Create(TemperatureSchedule),
    Update { id: String, patch: SchedulePatch },
    Delete { id: String },
}

impl TryFrom<ScheduleCommands> for ScheduleAction {
    type Error = anyhow::Error;

    fn try_from(command: ScheduleCommands) -> Result<Self> {
        match command {
            ScheduleCommands::List { fields } => {
                if let Some(unknown) = fields
                    .iter()
                    .find(|f| !SCHEDULE_COLUMNS.contains(&f.as_str()))
                {
                    return Err(EightError::validation(format!(
                        "unknown field '{}' (available: {})",
                        unknown,
                        SCHEDULE_COLUMNS.join(",")
                    ))
                    .into());
                }
                Ok(ScheduleAction::List { fields })
            }
            ScheduleCommands::Create {
                start,
                level,
                days,
                disabled,
            } => {
                let schedule =
                    TemperatureSchedule::new(start.unwrap_or_default(), level, days, !disabled);
                schedule.validate().map_err(EightError::Validation)?;
                Ok(ScheduleAction::Create(schedule))
            }
            ScheduleCommands::Update {
                id,
                start,
                level,
                days,
                enabled,
            } => {
                let mut patch = SchedulePatch::new();
                if let Some(start) = start {
                    patch.set_start_time(start);
                }
                if let Some(level) = level {
                    patch.set_level(level);
                }
                if let Some(days) = days {
                    patch.set_days_of_week(days);
                }
                if let Some(enabled) = enabled {
                    patch.set_enabled(enabled);
                }

                if patch.is_empty() {
                    return Err(EightError::validation("no fields to update").into());
                }
                Ok(ScheduleAction::Update { id, patch })
            }
            ScheduleCommands::Delete { id } => Ok(ScheduleAction::Delete { id }),
        }
    }
}

/// A travel query with its single parameter; empty means "not given"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelQuery {
    Trips,
    Plans { trip: String },
    Tasks { plan: String },
    AirportSearch { query: String },
    FlightStatus { flight: String },
}

impl TravelQuery {
    /// Name of the single column the result is rendered under
    pub fn column(&self) -> &'static str {
        match self {
            TravelQuery::Trips => "trips",
            TravelQuery::Plans { .. } => "plans",
            TravelQuery::Tasks { .. } => "tasks",
            TravelQuery::AirportSearch { .. } => "airports",
            TravelQuery::FlightStatus { .. } => "flight",
        }
    }
}

impl From<TravelCommands> for TravelQuery {
    fn from(command: TravelCommands) -> Self {
        match command {
            TravelCommands::Trips => TravelQuery::Trips,
            TravelCommands::Plans { trip } => TravelQuery::Plans {
                trip: trip.unwrap_or_default(),
            },
            TravelCommands::Tasks { plan } => TravelQuery::Tasks {
                plan: plan.unwrap_or_default(),
            },
            TravelCommands::AirportSearch { query } => TravelQuery::AirportSearch {
                query: query.unwrap_or_default(),
            },
            TravelCommands::FlightStatus { flight } => TravelQuery::FlightStatus {
                flight: flight.unwrap_or_default(),
            },
        }
    }
}
