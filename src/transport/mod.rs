//! HTTP transport: one GET per call, raw bytes back, cancellable.
//!
//! `Transport::get` returns a [`PendingResponse`] synchronously, before any
//! bytes arrive. The response resolves exactly once, either with the body,
//! with an error, or with `FetchError::Cancelled` when its token fires first.

mod cancel;
mod http;

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use tokio::sync::oneshot;

use crate::error::FetchError;

pub use cancel::CancelToken;
pub use http::HttpTransport;

/// Fixed per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the transport may use intermediate HTTP caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Let the protocol's caching headers decide.
    UseProtocol,
    /// Always go to the origin.
    ReloadIgnoringCache,
}

/// A single GET request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub cache_policy: CachePolicy,
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            cache_policy: CachePolicy::UseProtocol,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn accept(mut self, value: &'static str) -> Self {
        self.headers.insert(ACCEPT, HeaderValue::from_static(value));
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Resolve `path` against `origin`.
///
/// The path replaces the origin's path entirely; a query string after `?`
/// is kept.
pub fn compose_url(origin: &Url, path: &str) -> Result<Url, FetchError> {
    if !path.starts_with('/') {
        return Err(FetchError::bad_url(path));
    }
    let mut url = origin.clone();
    if url.cannot_be_a_base() {
        return Err(FetchError::bad_url(origin.as_str()));
    }
    let (path_part, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    url.set_path(path_part);
    url.set_query(query);
    Ok(url)
}

/// Issues GET requests. Implementations must be usable from any task.
pub trait Transport: Send + Sync {
    fn get(&self, request: TransportRequest) -> PendingResponse;
}

/// Handle to an in-flight request.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: oneshot::Receiver<Result<Vec<u8>, FetchError>>,
    token: CancelToken,
}

impl PendingResponse {
    /// Run `operation` on the current tokio runtime, racing it against a
    /// fresh cancel token.
    pub fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Result<Vec<u8>, FetchError>> + Send + 'static,
    {
        let token = CancelToken::new();
        let (sender, receiver) = oneshot::channel();
        let task_token = token.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    tracing::debug!("Request cancelled before completion");
                    Err(FetchError::Cancelled)
                }
                result = operation => result,
            };
            if sender.send(result).is_err() {
                tracing::trace!("Transport: response dropped (receiver gone)");
            }
        });

        Self { receiver, token }
    }

    /// A response that has already resolved, with no network operation behind it.
    pub fn ready(result: Result<Vec<u8>, FetchError>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(result);
        Self {
            receiver,
            token: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn wait(self) -> Result<Vec<u8>, FetchError> {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Cancelled),
        }
    }
}
