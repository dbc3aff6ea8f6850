//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TELEGRAM_* into the `telegram` section)
//! 2. Environment variables (AMAP_*)
//! 3. TOML config file (if AMAP_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, `TELEGRAM_TOPIC_ID`
/// 2. Environment variables (AMAP_*)
/// 3. TOML config file (if AMAP_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account login.
    ///
    /// Set via AMAP_USERNAME environment variable.
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,

    /// Account password.
    ///
    /// Set via AMAP_PASSWORD environment variable.
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,

    /// Site root, without trailing slash.
    ///
    /// Set via AMAP_BASE_DOMAIN environment variable.
    #[serde(default = "default_base_domain")]
    pub base_domain: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via AMAP_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via AMAP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Chat platform settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Required only by the bot binary.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat receiving scheduled notifications.
    #[serde(default)]
    pub chat_id: Option<i64>,

    /// Forum topic (message thread) inside `chat_id`.
    #[serde(default)]
    pub topic_id: Option<i64>,

    /// Long-polling timeout for getUpdates, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

/// When the periodic jobs run, in local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Weekday of the basket reminder (e.g. "thu").
    #[serde(default = "default_reminder_weekday")]
    pub reminder_weekday: String,

    /// Time of the basket reminder, `HH:MM`.
    #[serde(default = "default_reminder_time")]
    pub reminder_time: String,

    /// Time of the daily contracts check, `HH:MM`.
    #[serde(default = "default_contracts_check_time")]
    pub contracts_check_time: String,

    /// File touched by the heartbeat job.
    #[serde(default = "default_heartbeat_path")]
    pub heartbeat_path: PathBuf,

    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_base_domain() -> String {
    "https://votre-amap.easyamap.fr".into()
}

fn default_user_agent() -> String {
    concat!("amap-bot/", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_reminder_weekday() -> String {
    "thu".into()
}

fn default_reminder_time() -> String {
    "10:00".into()
}

fn default_contracts_check_time() -> String {
    "14:00".into()
}

fn default_heartbeat_path() -> PathBuf {
    PathBuf::from("heartbeat.txt")
}

fn default_heartbeat_interval_secs() -> u64 {
    60
}

/// Accept numbers too: env values like `AMAP_PASSWORD=123456` are parsed as integers by figment.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            base_domain: default_base_domain(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            telegram: TelegramConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { bot_token: None, chat_id: None, topic_id: None, poll_timeout_secs: default_poll_timeout_secs() }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reminder_weekday: default_reminder_weekday(),
            reminder_time: default_reminder_time(),
            contracts_check_time: default_contracts_check_time(),
            heartbeat_path: default_heartbeat_path(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_domain", &self.base_domain)
            .field("user_agent", &self.user_agent)
            .field("timeout_ms", &self.timeout_ms)
            .field("telegram", &self.telegram)
            .field("schedule", &self.schedule)
            .finish()
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("topic_id", &self.topic_id)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The layered provider chain used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("AMAP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(
                Env::prefixed("AMAP_")
                    .ignore(&["config_file"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
            .merge(
                Env::prefixed("TELEGRAM_")
                    .only(&["bot_token", "chat_id", "topic_id"])
                    .map(|key| format!("telegram.{}", key.as_str().to_lowercase()).into()),
            )
    }

    /// Account credentials, required before any request to the site.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the username or password is empty.
    pub fn require_credentials(&self) -> Result<(&str, &str), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Missing {
                field: "username".into(),
                hint: "Set AMAP_USERNAME environment variable".into(),
            });
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing {
                field: "password".into(),
                hint: "Set AMAP_PASSWORD environment variable".into(),
            });
        }
        Ok((&self.username, &self.password))
    }

    /// Bot API token (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_bot_token(&self) -> Result<&str, ConfigError> {
        self.telegram
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "telegram.bot_token".into(),
                hint: "Set TELEGRAM_BOT_TOKEN environment variable".into(),
            })
    }
}

impl ScheduleConfig {
    /// Parsed reminder weekday.
    pub fn reminder_weekday(&self) -> Result<Weekday, ConfigError> {
        self.reminder_weekday.parse::<Weekday>().map_err(|_| ConfigError::Invalid {
            field: "schedule.reminder_weekday".into(),
            reason: format!("unknown weekday '{}'", self.reminder_weekday),
        })
    }

    pub fn reminder_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time("schedule.reminder_time", &self.reminder_time)
    }

    pub fn contracts_check_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time("schedule.contracts_check_time", &self.contracts_check_time)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ConfigError::Invalid { field: field.into(), reason: format!("expected HH:MM, got '{value}'") })
}
