//! Client configuration

use std::time::Duration;

/// Default backend URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default background refetch interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Client configuration for connecting to the POS backend
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WARUNG_API_URL | http://localhost:8080 | Backend base URL |
/// | WARUNG_TOKEN | (none) | Bearer token |
/// | WARUNG_TIMEOUT_SECS | 30 | Request timeout |
/// | WARUNG_POLL_INTERVAL_MS | 5000 | List refetch interval |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080/api")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// How often list caches are refetched in the background
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("WARUNG_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            token: std::env::var("WARUNG_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout: std::env::var("WARUNG_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            poll_interval: std::env::var("WARUNG_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the background refetch interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
