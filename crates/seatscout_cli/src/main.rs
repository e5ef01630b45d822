mod commands;
mod console;
mod csv_report;
mod output;

use clap::{Parser, Subcommand};
use miette::Result;
use seatscout_core::config;
use seatscout_hubspot::HubSpotError;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::commands::audit::AuditOverrides;

const TOKEN_ENV: &str = "HUBSPOT_API_KEY";

#[derive(Parser)]
#[command(name = "seatscout")]
#[command(about = "Find unused HubSpot seats and what they cost")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// HubSpot private app token (defaults to HUBSPOT_API_KEY)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every seat and estimate the cost of unused ones
    Audit {
        /// CSV report path (overrides config)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Do not write a CSV report
        #[arg(long, conflicts_with = "csv")]
        no_csv: bool,

        /// Rows listed per confidence bucket
        #[arg(long)]
        top: Option<usize>,

        /// Monthly price of one seat (overrides config)
        #[arg(long)]
        seat_price: Option<u64>,

        /// Print the full report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check which HubSpot APIs the token can reach
    Probe,
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "seatscout.toml")]
        path: PathBuf,
    },
}

/// `--token`, else the environment (after `.env` is loaded)
fn resolve_token(flag: Option<String>) -> std::result::Result<String, HubSpotError> {
    flag.or_else(|| std::env::var(TOKEN_ENV).ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(HubSpotError::MissingToken)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    // Initialize tracing
    use tracing_subscriber::{EnvFilter, fmt};

    let default_filter = if cli.debug {
        "seatscout_core=debug,seatscout_hubspot=debug,seatscout_cli=debug"
    } else {
        // Show info level for seatscout crates, warn for everything else
        "seatscout_core=info,seatscout_hubspot=info,seatscout_cli=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .compact()
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        info!("Loading config from standard locations");
        config::load_config_from_standard_locations().await?
    };

    match cli.command {
        Commands::Audit {
            csv,
            no_csv,
            top,
            seat_price,
            json,
        } => {
            let overrides = AuditOverrides {
                csv,
                no_csv,
                top,
                seat_price,
            };
            overrides.apply(&mut config);
            debug!(?config, "effective configuration");

            let token = resolve_token(cli.token)?;
            commands::audit::run(&config, &token, overrides.csv_path(&config), json).await?;
        }
        Commands::Probe => {
            let token = resolve_token(cli.token)?;
            commands::probe::run(&config, &token).await?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => commands::config::show(&config).await?,
            ConfigCommands::Save { path } => commands::config::save(&config, &path).await?,
        },
    }

    Ok(())
}
