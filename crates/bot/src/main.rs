//! amap-bot entry point.
//!
//! Boots the scraping service, starts the scheduled jobs and long-polls the
//! Telegram Bot API for commands until interrupted.
//! Logging goes to stderr.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use amap_client::{AmapService, HttpTransport};
use amap_core::AppConfig;

mod error;
mod format;
mod handler;
mod jobs;
mod polling;
mod telegram;
#[cfg(test)]
mod testing;

use handler::Bot;
use jobs::JobSettings;
use polling::poll_updates;
use telegram::{TelegramClient, TelegramConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting amap-bot");

    let config = AppConfig::load()?;
    let token = config.require_bot_token()?.to_string();
    let settings = JobSettings::from_config(&config)?;

    let service = Arc::new(AmapService::from_config(&config)?);
    let telegram = Arc::new(TelegramClient::new(TelegramConfig::new(
        token,
        Duration::from_secs(config.telegram.poll_timeout_secs),
    ))?);
    let bot: Arc<Bot<HttpTransport, TelegramClient>> = Arc::new(Bot::new(service, Arc::clone(&telegram)));

    let jobs = jobs::spawn_all(&bot, &settings);
    tracing::info!(jobs = jobs.len(), "bot ready");

    let outcome = tokio::select! {
        result = poll_updates(&bot, telegram.as_ref()) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    };

    for job in jobs {
        job.abort();
    }

    outcome?;
    Ok(())
}
