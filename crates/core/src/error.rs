//! Unified error types for the AMAP scraper.
//!
//! Every expected failure of the scraping layer is one of these variants.
//! Callers that only care about "data or nothing" log the error and move on;
//! callers that need to distinguish an auth problem from a flaky network can
//! match on the variant.

/// Unified error types for the scraping core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Timeout, connection failure or unreadable body.
    #[error("NETWORK_FAILURE: {0}")]
    Network(String),

    /// Missing anti-forgery token, or login still lands on the login page.
    #[error("AUTH_FAILURE: {0}")]
    Auth(String),

    /// Expected HTML structure absent.
    #[error("PARSE_FAILURE: {0}")]
    Parse(String),

    /// Invalid input parameters (e.g., unparseable date).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Short machine-readable tag, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) => "network",
            Error::Auth(_) => "auth",
            Error::Parse(_) => "parse",
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
