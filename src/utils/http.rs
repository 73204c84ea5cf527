//! HTTP client utilities.

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed to establish a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default time allowed between reads of the response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while fetching a URL
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The URL could not be parsed; no request was made
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server answered with something other than 200 OK
    #[error("Unexpected HTTP status: {0}")]
    Status(StatusCode),

    /// The connection or a read timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// DNS, connection or body stream failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The HTTP client itself could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Shared HTTP client performing single GET requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(
            default_user_agent(),
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_READ_TIMEOUT,
        )
    }

    /// Create a new HTTP client with a custom user agent and timeouts
    pub fn with_timeouts(
        user_agent: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET `url` and return the body of a 200 response
    ///
    /// The URL is validated before any connection is attempted. Any status
    /// other than 200 is an error and the body is left unread.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("GET {}", parsed);
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("Error response code: {}", status.as_u16());
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        tracing::debug!("Received {} bytes", body.len());
        Ok(body.to_vec())
    }
}

/// `booklisting/<version>`
pub fn default_user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}
