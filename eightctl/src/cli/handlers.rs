//! Command execution handlers

use anyhow::Result;
use eight_core::{OutputRow, TemperatureSchedule};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::client::{EightApi, TravelApi};
use crate::config::{CliConfig, Credentials};
use crate::format::{self, OutputFormat};

use super::commands::*;
use super::requests::{ScheduleAction, TravelQuery, SCHEDULE_COLUMNS};

/// Resolved configuration handed to every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Effective configuration (file, env and flags merged)
    pub config: CliConfig,
    /// Config file used by `config set` / `config reset`
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(config: CliConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Output format selected by the configuration
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_name(&self.config.output_format)
    }
}

/// Execute one command.
///
/// Input is validated first, then credentials are checked, and only then is
/// `connect` called to build the client. Any failure before that point means
/// no client was built and nothing went over the network.
pub async fn run<C, F>(
    command: Commands,
    ctx: &CommandContext,
    connect: F,
    out: &mut dyn Write,
) -> Result<()>
where
    C: EightApi,
    F: FnOnce(Credentials) -> Result<C>,
{
    let format = ctx.output_format()?;

    match command {
        Commands::Schedule { command } => {
            let action = ScheduleAction::try_from(command)?;
            let client = connect_with(&ctx.config, connect)?;
            handle_schedule(&client, action, format, out).await
        }
        Commands::Travel { command } => {
            let query = TravelQuery::from(command);
            let client = connect_with(&ctx.config, connect)?;
            handle_travel(client.travel(), query, format, out).await
        }
        Commands::Config { command } => handle_config(command, ctx, format, out),
        Commands::Completion { shell } => {
            generate_completion(shell, out);
            Ok(())
        }
    }
}

fn connect_with<C, F>(config: &CliConfig, connect: F) -> Result<C>
where
    F: FnOnce(Credentials) -> Result<C>,
{
    let credentials = config.credentials()?;
    debug!("Building client for {}", credentials.email);
    connect(credentials)
}

/// Project a schedule into its display row
fn schedule_row(schedule: &TemperatureSchedule) -> OutputRow {
    let mut row = OutputRow::new();
    row.insert("id".to_string(), Value::from(schedule.id_str()));
    row.insert("start".to_string(), Value::from(schedule.start_time.as_str()));
    row.insert("level".to_string(), Value::from(schedule.level));
    row.insert(
        "days".to_string(),
        Value::from(schedule.days_of_week.clone()),
    );
    row.insert("enabled".to_string(), Value::Bool(schedule.enabled));
    row
}

/// Handle schedule commands
pub async fn handle_schedule(
    client: &dyn EightApi,
    action: ScheduleAction,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        ScheduleAction::List { fields } => {
            let schedules = client.list_schedules().await?;
            debug!("Fetched {} schedules", schedules.len());

            let rows: Vec<OutputRow> = schedules.iter().map(schedule_row).collect();
            let rows = format::filter_fields(rows, &fields);
            let columns = format::select_columns(&SCHEDULE_COLUMNS, &fields);
            format::print(out, format, &columns, &rows)?;
        }
        ScheduleAction::Create(schedule) => {
            let created = client.create_schedule(schedule).await?;
            writeln!(out, "created schedule {}", created.id_str())?;
        }
        ScheduleAction::Update { id, patch } => {
            client.update_schedule(&id, &patch).await?;
            writeln!(out, "updated")?;
        }
        ScheduleAction::Delete { id } => {
            client.delete_schedule(&id).await?;
            writeln!(out, "deleted")?;
        }
    }

    Ok(())
}

/// Handle travel queries.
///
/// The result is one opaque value, rendered as a single row with a single
/// column named after the query.
pub async fn handle_travel(
    travel: &dyn TravelApi,
    query: TravelQuery,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let column = query.column();
    let result = match &query {
        TravelQuery::Trips => travel.trips().await?,
        TravelQuery::Plans { trip } => travel.plans(trip).await?,
        TravelQuery::Tasks { plan } => travel.plan_tasks(plan).await?,
        TravelQuery::AirportSearch { query } => travel.airport_search(query).await?,
        TravelQuery::FlightStatus { flight } => travel.flight_status(flight).await?,
    };

    let mut row = OutputRow::new();
    row.insert(column.to_string(), result);
    format::print(out, format, &[column.to_string()], &[row])
}

/// Handle config commands
pub fn handle_config(
    command: ConfigCommands,
    ctx: &CommandContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let path = ctx.config_path.as_deref();

    match command {
        ConfigCommands::Show => {
            let shown = ctx.config.redacted();
            match format {
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&shown)?)?;
                }
                OutputFormat::Table => {
                    let or_unset = |v: &Option<String>| {
                        Value::from(v.clone().unwrap_or_else(|| "(unset)".to_string()))
                    };
                    let settings = [
                        ("email", or_unset(&shown.email)),
                        ("password", or_unset(&shown.password)),
                        ("user_id", or_unset(&shown.user_id)),
                        ("client_id", or_unset(&shown.client_id)),
                        ("client_secret", or_unset(&shown.client_secret)),
                        ("output_format", Value::from(shown.output_format.clone())),
                        ("verbose", Value::Bool(shown.verbose)),
                        ("timeout", Value::from(shown.timeout)),
                        ("api_url", Value::from(shown.api_url.clone())),
                        ("auth_url", Value::from(shown.auth_url.clone())),
                    ];
                    let rows: Vec<OutputRow> = settings
                        .into_iter()
                        .map(|(name, value)| {
                            let mut row = OutputRow::new();
                            row.insert("setting".to_string(), Value::from(name));
                            row.insert("value".to_string(), value);
                            row
                        })
                        .collect();
                    let columns = ["setting".to_string(), "value".to_string()];
                    format::print(out, format, &columns, &rows)?;
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load(path)?;
            let is_secret = matches!(key.as_str(), "password" | "client_secret");
            let shown = if is_secret {
                "********".to_string()
            } else {
                value.clone()
            };

            config.set_key(&key, value)?;
            config.save(path)?;
            writeln!(out, "{}", format::format_success(&format!("Set {} = {}", key, shown)))?;
        }
        ConfigCommands::Reset => {
            CliConfig::default().save(path)?;
            writeln!(out, "{}", format::format_success("Configuration reset to defaults"))?;
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell, out: &mut dyn Write) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}
