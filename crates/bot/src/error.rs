//! Errors raised while talking to the Telegram Bot API.

use std::sync::Arc;
use std::time::Duration;

/// Errors from the Telegram client.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Token rejected by the API.
    #[error("TELEGRAM_AUTH: bot token rejected")]
    Unauthorized,

    /// Flood control; the API says when to come back.
    #[error("TELEGRAM_RATE_LIMITED: retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The API answered `ok: false`.
    #[error("TELEGRAM_API: {code}: {description}")]
    Api { code: u16, description: String },

    /// Request timeout.
    #[error("TELEGRAM_TIMEOUT: request timed out")]
    Timeout,

    /// Network error.
    #[error("TELEGRAM_NETWORK: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body was not the expected JSON.
    #[error("TELEGRAM_PARSE: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // the request URL carries the bot token
        if err.is_timeout() { TelegramError::Timeout } else { TelegramError::Network(Arc::new(err.without_url())) }
    }
}

impl TelegramError {
    /// Whether the polling loop should wait and try again.
    pub fn is_transient(&self) -> bool {
        match self {
            TelegramError::RateLimited { .. } | TelegramError::Timeout | TelegramError::Network(_) => true,
            TelegramError::Api { code, .. } => *code >= 500,
            TelegramError::Unauthorized | TelegramError::Parse(_) => false,
        }
    }

    /// How long to wait before the next attempt.
    pub fn backoff(&self) -> Duration {
        match self {
            TelegramError::RateLimited { retry_after } => *retry_after,
            _ => Duration::from_secs(5),
        }
    }
}
