//! HTTP fetch pipeline with a persistent, authenticated session.
//!
//! ### Transport
//! - One `reqwest` client with a cookie store: the site's session cookie is
//!   the only session state.
//! - Redirects are followed; the final URL is reported with every page.
//! - Non-2xx statuses are not errors; pages are returned as is.
//!
//! ### Session
//! - A GET that lands on the login page triggers one login (anti-forgery
//!   token + credentials) and one retry of the GET.
//! - No further retry and no backoff.

pub mod session;
pub mod url;

#[cfg(test)]
pub(crate) mod fake;

use reqwest::Client;
use std::time::{Duration, Instant};

pub use self::url::{BASKET_WINDOW_DAYS, SiteUrls};
pub use session::{Credentials, Session};

use ::url::Url;
use amap_core::{AppConfig, Error};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "amap-bot/<version>")
    pub user_agent: String,

    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("amap-bot/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(15),
            max_redirects: 10,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

/// Raw HTTP access sharing one cookie jar.
///
/// Implemented by [`HttpTransport`] for the real site and by a scripted fake
/// in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, following redirects.
    async fn get(&self, url: &Url) -> Result<Page, Error>;

    /// POST `form` urlencoded to `url`, following redirects.
    async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<Page, Error>;
}

/// `reqwest`-backed transport with a persistent cookie store.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .cookie_store(true)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    async fn read(&self, request: reqwest::RequestBuilder, url: &Url) -> Result<Page, Error> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| network_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| network_error(url, e))?;

        tracing::debug!(
            "fetched {} -> {} in {}ms (status {}, {} bytes)",
            url,
            final_url,
            start.elapsed().as_millis(),
            status,
            body.len()
        );

        Ok(Page { final_url, status, body })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Page, Error> {
        let request = self
            .http
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8");
        self.read(request, url).await
    }

    async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<Page, Error> {
        let request = self.http.post(url.as_str()).form(form);
        self.read(request, url).await
    }
}

fn network_error(url: &Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("timeout fetching {url}"))
    } else {
        Error::Network(format!("{url}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert!(config.user_agent.starts_with("amap-bot/"));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "test-agent".into(), timeout_ms: 2_000, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn test_http_transport_new() {
        let transport = HttpTransport::new(&FetchConfig::default());
        assert!(transport.is_ok());
    }
}
