//! Telegram Bot API client.
//!
//! ### Protocol
//!
//! - **Endpoint**: `https://api.telegram.org/bot<token>/<method>`, JSON in and out.
//! - **Updates**: `getUpdates` long polling; the offset acknowledges every
//!   update already seen.
//! - **Rate Limiting**: one outgoing message per second at most; a 429 is
//!   reported with the server's `retry_after`.

pub mod types;

pub use types::{ChatTarget, Message, SendMessage, Update};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::TelegramError;
use types::{ApiResponse, GetUpdates};

/// Default base URL for the Bot API.
const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Minimum interval between two outgoing messages.
const MIN_SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Slack added to the long-polling timeout for the HTTP request itself.
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Anything that can deliver a message to a chat.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, message: &SendMessage) -> Result<(), TelegramError>;
}

/// Anything that yields incoming updates.
#[async_trait::async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates after `offset`.
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError>;
}

/// Telegram client configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    /// Base URL (default: https://api.telegram.org).
    pub base_url: String,
    /// `getUpdates` long-polling timeout.
    pub poll_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>, poll_timeout: Duration) -> Self {
        Self { token: token.into(), base_url: DEFAULT_BASE_URL.to_string(), poll_timeout }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

/// Rate limiter to enforce send intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: TelegramConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(config.poll_timeout + POLL_SLACK)
            .build()
            .map_err(TelegramError::from)?;

        Ok(Self { http, config, rate_limiter: Arc::new(RateLimiter::new(MIN_SEND_INTERVAL)) })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.config.base_url, self.config.token, method)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, TelegramError> {
        let start = Instant::now();
        let response = self.http.post(self.method_url(method)).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!("telegram {} -> {} in {}ms", method, status, start.elapsed().as_millis());

        decode(method, status.as_u16(), &bytes)
    }
}

#[async_trait::async_trait]
impl UpdateSource for TelegramClient {
    /// Waits up to the configured poll timeout.
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let query = GetUpdates { offset, timeout: self.config.poll_timeout.as_secs(), allowed_updates: &["message"] };
        self.call("getUpdates", &query).await
    }
}

#[async_trait::async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, message: &SendMessage) -> Result<(), TelegramError> {
        self.rate_limiter.acquire().await;
        let _sent: serde_json::Value = self.call("sendMessage", message).await?;
        Ok(())
    }
}

/// Decode a response body. A body that is not an envelope keeps the HTTP
/// status, so a gateway error page stays a server error.
fn decode<T: DeserializeOwned>(method: &str, status: u16, body: &[u8]) -> Result<T, TelegramError> {
    match serde_json::from_slice::<ApiResponse<T>>(body) {
        Ok(envelope) => into_result(envelope, status),
        Err(e) if status >= 500 => Err(TelegramError::Api { code: status, description: format!("{method}: {e}") }),
        Err(e) => Err(TelegramError::Parse(format!("{method}: {e}"))),
    }
}

/// Map the response envelope to the payload or a typed error.
fn into_result<T>(envelope: ApiResponse<T>, status: u16) -> Result<T, TelegramError> {
    if envelope.ok
        && let Some(result) = envelope.result
    {
        return Ok(result);
    }

    let code = envelope.error_code.unwrap_or(status);
    let description = envelope.description.unwrap_or_else(|| "no description".to_string());
    match code {
        401 | 404 => Err(TelegramError::Unauthorized),
        429 => {
            let secs = envelope.parameters.and_then(|p| p.retry_after).unwrap_or(5);
            Err(TelegramError::RateLimited { retry_after: Duration::from_secs(secs) })
        }
        _ => Err(TelegramError::Api { code, description }),
    }
}

/// Offset acknowledging every update in `updates`.
pub fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates.iter().map(|u| u.update_id + 1).max().unwrap_or(current).max(current)
}
