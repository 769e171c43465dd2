use std::time::Instant;

use reqwest::header::{HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::FetchError;

use super::{CachePolicy, PendingResponse, Transport, TransportRequest};

/// reqwest-backed transport. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: TransportRequest) -> PendingResponse {
        let client = self.client.clone();
        PendingResponse::spawn(execute(client, request))
    }
}

async fn execute(client: Client, request: TransportRequest) -> Result<Vec<u8>, FetchError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();
    let url = request.url.clone();

    let mut builder = client
        .get(request.url)
        .headers(request.headers)
        .timeout(request.timeout);

    if request.cache_policy == CachePolicy::ReloadIgnoringCache {
        builder = builder
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .header(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    tracing::debug!(request_id = %request_id, url = %url, "GET");

    let response = builder.send().await.map_err(|e| {
        tracing::debug!(request_id = %request_id, url = %url, error = %e, "Request failed");
        FetchError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(
            request_id = %request_id,
            url = %url,
            status = status.as_u16(),
            "Unsuccessful status"
        );
        return Err(FetchError::Server {
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        });
    }

    let body = response.bytes().await?;

    tracing::debug!(
        request_id = %request_id,
        url = %url,
        status = status.as_u16(),
        bytes = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "GET complete"
    );

    Ok(body.to_vec())
}
