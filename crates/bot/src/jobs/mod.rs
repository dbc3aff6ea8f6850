//! Background jobs: weekly basket reminder, daily contracts check, heartbeat.
//!
//! Each job runs in its own task. A failing run is logged and the job waits
//! for its next slot; nothing here stops the bot.

pub mod schedule;

pub use schedule::{Schedule, delay_until};

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::TelegramError;
use crate::format;
use crate::handler::Bot;
use crate::telegram::{ChatTarget, Messenger, SendMessage};
use amap_client::Transport;
use amap_core::{AppConfig, ConfigError};

/// Delay before the first heartbeat.
const HEARTBEAT_FIRST_RUN: Duration = Duration::from_secs(10);

/// Job timing and destination, resolved from configuration.
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Chat (and topic) that receives reminders and notifications.
    pub target: Option<ChatTarget>,
    pub reminder: Schedule,
    pub contracts_check: Schedule,
    pub heartbeat_path: PathBuf,
    pub heartbeat_interval: Duration,
}

impl JobSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let schedule = &config.schedule;
        let target = config
            .telegram
            .chat_id
            .map(|chat_id| ChatTarget { chat_id, thread_id: config.telegram.topic_id });

        Ok(Self {
            target,
            reminder: Schedule::Weekly(schedule.reminder_weekday()?, schedule.reminder_time()?),
            contracts_check: Schedule::Daily(schedule.contracts_check_time()?),
            heartbeat_path: schedule.heartbeat_path.clone(),
            heartbeat_interval: schedule.heartbeat_interval(),
        })
    }
}

/// Start every job. Chat jobs are skipped when no chat is configured.
pub fn spawn_all<T, M>(bot: &Arc<Bot<T, M>>, settings: &JobSettings) -> Vec<JoinHandle<()>>
where
    T: Transport + 'static,
    M: Messenger + 'static,
{
    let mut handles = vec![tokio::spawn(heartbeat_loop(settings.heartbeat_path.clone(), settings.heartbeat_interval))];

    let Some(target) = settings.target else {
        tracing::warn!("no chat_id configured, reminder and contracts jobs disabled");
        return handles;
    };

    let reminder_bot = Arc::clone(bot);
    handles.push(tokio::spawn(run_on_schedule("weekly_reminder", settings.reminder, move || {
        let bot = Arc::clone(&reminder_bot);
        async move { log_failure("weekly_reminder", weekly_reminder(&bot, target).await.map(|_| ())) }
    })));

    let contracts_bot = Arc::clone(bot);
    handles.push(tokio::spawn(run_on_schedule("contracts_check", settings.contracts_check, move || {
        let bot = Arc::clone(&contracts_bot);
        async move { log_failure("contracts_check", contracts_check(&bot, target).await.map(|_| ())) }
    })));

    handles
}

async fn run_on_schedule<F, Fut>(name: &'static str, schedule: Schedule, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let now = Local::now().naive_local();
        let next = schedule.next_after(now);
        tracing::info!(job = name, next = %next, "job scheduled");

        tokio::time::sleep(delay_until(now, next)).await;

        tracing::info!(job = name, "job running");
        job().await;
    }
}

fn log_failure(name: &str, result: Result<(), TelegramError>) {
    if let Err(e) = result {
        if e.is_transient() {
            tracing::warn!(job = name, error = %e, "job could not notify, will retry next run");
        } else {
            tracing::error!(job = name, error = %e, "job failed");
        }
    }
}

/// Send the upcoming Friday's basket to `target`.
pub async fn weekly_reminder<T: Transport, M: Messenger>(
    bot: &Bot<T, M>, target: ChatTarget,
) -> Result<bool, TelegramError> {
    let sent = bot.send_basket(target).await?;
    if !sent {
        tracing::warn!("weekly reminder: nothing to send");
    }
    Ok(sent)
}

/// Notify `target` of each new or updated contract. Returns how many
/// notifications were sent.
///
/// The first run only seeds the snapshot; fetch failures are logged.
pub async fn contracts_check<T: Transport, M: Messenger>(
    bot: &Bot<T, M>, target: ChatTarget,
) -> Result<usize, TelegramError> {
    let delta = match bot.service().poll_contract_changes().await {
        Ok(delta) => delta,
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), "contracts check failed");
            return Ok(0);
        }
    };

    if delta.is_empty() {
        tracing::info!("no contract changes");
        return Ok(0);
    }

    tracing::info!(changes = delta.len(), "notifying contract changes");
    for change in delta.iter() {
        tracing::info!(kind = ?change.kind, title = %change.contract.title, "contract change");
        let message = SendMessage::markdown(target, format::contract_change(&change.contract));
        bot.messenger().send(&message).await?;
    }
    Ok(delta.len())
}

async fn heartbeat_loop(path: PathBuf, every: Duration) {
    let start = tokio::time::Instant::now() + HEARTBEAT_FIRST_RUN;
    let mut ticker = tokio::time::interval_at(start, every);
    loop {
        ticker.tick().await;
        if let Err(e) = touch(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "heartbeat write failed");
        }
    }
}

/// Create `path` or refresh its modification time.
pub async fn touch(path: &Path) -> std::io::Result<()> {
    tokio::fs::write(path, Local::now().to_rfc3339()).await
}
