//! HTTP client wrapper and endpoint configuration

use reqwest::Client as ReqwestClient;

use crate::error::{Error, Result};

/// Default REST base URL for a local backend
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Environment variable overriding the REST base URL
pub const API_URL_ENV: &str = "COURTSIDE_API_URL";

/// Environment variable overriding the stream base URL
pub const WS_URL_ENV: &str = "COURTSIDE_WS_URL";

/// Endpoint configuration for the backend
///
/// Holds the REST base URL and the stream URL. The stream URL is derived
/// from the REST base by protocol substitution (`http` → `ws`, `https` →
/// `wss`, plus the `/ws` path) unless overridden explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    ws_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ApiConfig {
    /// Create a configuration from a REST base URL, deriving the stream URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = trim_trailing_slash(base_url.into());
        let ws_url = derive_ws_url(&base_url);
        Self { base_url, ws_url }
    }

    /// Override the derived stream URL
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = trim_trailing_slash(ws_url.into());
        self
    }

    /// Build a configuration from the environment
    ///
    /// Reads `COURTSIDE_API_URL` and `COURTSIDE_WS_URL`, falling back to the
    /// localhost defaults when unset or empty.
    pub fn from_env() -> Self {
        let base = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let config = Self::new(base);
        match std::env::var(WS_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            Some(ws) => config.with_ws_url(ws),
            None => config,
        }
    }

    /// The REST base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The stream endpoint URL
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// URL of the live-matches bootstrap fetch
    pub fn live_matches_url(&self) -> String {
        format!("{}/api/matches?status=Live", self.base_url)
    }

    /// URL of the tournaments query
    pub fn tournaments_url(&self, status: Option<&str>) -> String {
        match status {
            Some(status) => format!("{}/api/tournaments?status={status}", self.base_url),
            None => format!("{}/api/tournaments", self.base_url),
        }
    }

    /// URL of the past-matches query
    pub fn past_matches_url(&self) -> String {
        format!("{}/api/matches/past", self.base_url)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Substitute the URL scheme and append the stream path
fn derive_ws_url(base_url: &str) -> String {
    let swapped = if let Some(rest) = base_url.strip_prefix("https") {
        format!("wss{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http") {
        format!("ws{rest}")
    } else {
        base_url.to_string()
    };
    format!("{swapped}/ws")
}

/// Backend API client
#[derive(Debug, Clone)]
pub struct Client {
    http: ReqwestClient,
    config: ApiConfig,
}

impl Client {
    /// Create a client for the given endpoint configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::Config("base URL must not be empty".to_string()));
        }
        let http = ReqwestClient::builder().build().map_err(Error::Http)?;
        Ok(Self { http, config })
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env())
    }

    /// The endpoint configuration in use
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &ReqwestClient {
        &self.http
    }
}
