//! Error taxonomy shared by the transport, the catalogue API and the datasource.
//!
//! Every failure a fetch can produce is one of four kinds. `Cancelled` is an
//! expected control-flow outcome (a superseded request) and is swallowed by
//! the datasource before it reaches a consumer.

use thiserror::Error;

/// Errors produced while fetching catalogue data or images.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The request URL could not be built, or the path is not a catalogue path.
    #[error("Bad URL: {url}")]
    BadUrl { url: String },

    /// The request was cancelled before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// Non-2xx status, or a transport-level failure (connect, timeout, reset).
    #[error("Server error{}: {message}", status_suffix(.status))]
    Server { status: Option<u16>, message: String },

    /// The payload could not be decoded as JSON or as an image.
    #[error("Decode error: {message}")]
    Decode { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl FetchError {
    pub fn bad_url(url: impl Into<String>) -> Self {
        FetchError::BadUrl { url: url.into() }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        FetchError::Decode {
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Stable identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::BadUrl { .. } => "bad_url",
            FetchError::Cancelled => "cancelled",
            FetchError::Server { .. } => "server_error",
            FetchError::Decode { .. } => "decode_error",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Server {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::decode(err.to_string())
    }
}

impl From<image::ImageError> for FetchError {
    fn from(err: image::ImageError) -> Self {
        FetchError::decode(err.to_string())
    }
}
