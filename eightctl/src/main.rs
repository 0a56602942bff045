//! eightctl
//!
//! Command-line interface for temperature schedules and travel data.

use anyhow::Result;
use clap::Parser;
use colored::*;
use eightctl::cli::{run, Cli, CommandContext};
use eightctl::client::{ClientOptions, EightClient};
use eightctl::config::CliConfig;
use tracing::debug;

/// Resolve the effective configuration: CLI args → env → file → defaults
fn build_config(cli: &Cli) -> Result<CliConfig> {
    let mut builder = CliConfig::builder()
        .with_email(cli.email.clone())
        .with_password(cli.password.clone())
        .with_user_id(cli.user_id.clone())
        .with_client_id(cli.client_id.clone())
        .with_client_secret(cli.client_secret.clone());

    if let Some(format) = cli.output {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.with_api_url(url)?;
    }
    if let Some(ref url) = cli.auth_url {
        builder = builder.with_auth_url(url)?;
    }

    builder
        .with_env_overrides()
        .with_config_file(!cli.no_config, cli.config.as_deref())?
        .build()
}

/// Initialize logging to stderr; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), e);
            if cli.verbose {
                eprintln!("Error details: {:?}", e);
            }
            std::process::exit(1);
        }
    };

    let verbose = config.verbose;
    init_tracing(verbose);
    debug!(
        "API URL: {}, auth URL: {}, output format: {}",
        config.api_url, config.auth_url, config.output_format
    );

    let options = ClientOptions::from_config(&config);
    let ctx = CommandContext::new(config, cli.config.clone());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run(
        cli.command,
        &ctx,
        |credentials| EightClient::new(credentials, options),
        &mut out,
    )
    .await;

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }
}
