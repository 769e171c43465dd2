use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote catalogue origin and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// URL scheme of the catalogue origin ("https" or "http").
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Host (optionally with port) serving `/catalog` and `/categories`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g. "info", "shopfeed=debug").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_host() -> String {
    "mobile-code-challenge.s3.eu-central-1.amazonaws.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_user_agent() -> String {
    format!("shopfeed/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl ApiConfig {
    /// Origin every catalogue path is resolved against.
    pub fn origin(&self) -> Result<Url, FetchError> {
        let raw = format!("{}://{}", self.scheme, self.host);
        Url::parse(&raw).map_err(|_| FetchError::bad_url(raw))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }
}
