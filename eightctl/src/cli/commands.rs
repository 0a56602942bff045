//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use eight_core::types::MAX_DAY_OF_WEEK;
use std::path::PathBuf;

/// Temperature schedule and travel CLI
#[derive(Parser, Debug)]
#[command(name = "eightctl")]
#[command(version, about = "Manage temperature schedules and travel data", long_about = None)]
pub struct Cli {
    /// Account email (overrides config file)
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Account password (overrides config file)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Account user id (overrides config file)
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// OAuth client id (overrides config file)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret (overrides config file)
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API base URL (overrides config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Token service base URL (overrides config file)
    #[arg(long, global = true)]
    pub auth_url: Option<String>,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/eightctl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Configuration string for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage device temperature schedules
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },

    /// Travel / jetlag queries
    Travel {
        #[command(subcommand)]
        command: TravelCommands,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn day_of_week() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..=MAX_DAY_OF_WEEK as i64)
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List schedules
    List {
        /// Comma-separated columns to show (id,start,level,days,enabled)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Create schedule
    Create {
        /// HH:MM start time (required)
        #[arg(long)]
        start: Option<String>,

        /// Temperature level -100..100
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        level: i32,

        /// Comma-separated days 0=Sun..6=Sat
        #[arg(long, value_delimiter = ',', value_parser = day_of_week())]
        days: Vec<u8>,

        /// Create disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Update schedule; only the options given are changed
    Update {
        /// Schedule ID
        id: String,

        /// HH:MM start time
        #[arg(long)]
        start: Option<String>,

        /// Temperature level -100..100
        #[arg(long, allow_hyphen_values = true)]
        level: Option<i32>,

        /// Comma-separated days 0=Sun..6=Sat
        #[arg(long, value_delimiter = ',', value_parser = day_of_week())]
        days: Option<Vec<u8>>,

        /// Enable/disable schedule (--enabled or --enabled=false)
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        enabled: Option<bool>,
    },

    /// Delete schedule
    Delete {
        /// Schedule ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TravelCommands {
    /// List trips
    Trips,

    /// List plans, optionally for one trip
    Plans {
        /// Trip id
        #[arg(long)]
        trip: Option<String>,
    },

    /// List tasks of a plan
    Tasks {
        /// Plan id
        #[arg(long)]
        plan: Option<String>,
    },

    /// Search airports
    AirportSearch {
        /// Airport query
        #[arg(long)]
        query: Option<String>,
    },

    /// Look up flight status
    FlightStatus {
        /// Flight number
        #[arg(long)]
        flight: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}
