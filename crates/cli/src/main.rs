//! amap: one-shot access to the AMAP site from the command line.
//!
//! Reads the same configuration as the bot and prints JSON on stdout.
//!
//! # Usage
//!
//! Baskets for the next 14 days, or only the upcoming Friday:
//! ```sh
//! amap basket
//! amap basket --date 2024-05-08 --friday
//! ```
//!
//! Open contracts, and what changed since the previous fetch:
//! ```sh
//! amap contracts --force
//! amap diff
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use amap_client::{AmapService, HttpTransport};
use amap_core::AppConfig;

/// Command-line client for the AMAP site.
#[derive(Parser, Debug)]
#[command(name = "amap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Products to collect, per distribution date
    Basket {
        /// First day of the 14-day window (YYYY-MM-DD, default: today)
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// Only print the entry for the upcoming Friday
        #[arg(long, short = 'f')]
        friday: bool,
    },

    /// Contracts open for subscription
    Contracts {
        /// Bypass today's cached list
        #[arg(long)]
        force: bool,
    },

    /// New or updated contracts between two consecutive fetches
    Diff,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn run(service: &AmapService<HttpTransport>, command: Commands) -> Result<()> {
    match command {
        Commands::Basket { date, friday } => {
            let snapshot = service.get_basket(date).await?;
            if friday {
                let day = service.find_basket_for_friday(&snapshot);
                if day.is_none() {
                    info!(dates = snapshot.len(), "no entry for the upcoming friday");
                }
                print_json(&day)
            } else {
                print_json(&*snapshot)
            }
        }
        Commands::Contracts { force } => {
            let contracts = service.get_contracts(force).await?;
            print_json(contracts.as_slice())
        }
        Commands::Diff => {
            service.get_contracts(true).await?;
            let delta = service.poll_contract_changes().await?;
            print_json(&delta)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match AmapService::from_config(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("failed to set up the AMAP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&service, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
