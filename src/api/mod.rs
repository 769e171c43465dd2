//! Catalogue API: domain operations mapped onto transport GETs.
//!
//! Every operation returns an [`ApiCall`] immediately. The call carries the
//! transport's cancel token and decodes the body when awaited.

mod decoded;
mod models;
mod paths;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::transport::{
    compose_url, CachePolicy, CancelToken, HttpTransport, PendingResponse, Transport,
    TransportRequest, DEFAULT_TIMEOUT,
};

pub use decoded::DecodedImage;
pub use models::{CategoryEnvelope, Currency, Item, PageEnvelope, Price};
pub use paths::{is_catalog_path, resolve_locator, ApiPath};

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_IMAGE: &str = "image/*";

type Decoder<T> = fn(&[u8]) -> Result<T, FetchError>;

/// An issued API request that decodes into `T`.
pub struct ApiCall<T> {
    pending: PendingResponse,
    decode: Decoder<T>,
}

impl<T> ApiCall<T> {
    fn new(pending: PendingResponse, decode: Decoder<T>) -> Self {
        Self { pending, decode }
    }

    fn failed(err: FetchError, decode: Decoder<T>) -> Self {
        Self::new(PendingResponse::ready(Err(err)), decode)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.pending.cancel_token()
    }

    pub fn cancel(&self) {
        self.pending.cancel();
    }

    pub async fn wait(self) -> Result<T, FetchError> {
        let bytes = self.pending.wait().await?;
        (self.decode)(&bytes)
    }
}

/// Client for the remote catalogue.
#[derive(Clone)]
pub struct CatalogApi {
    transport: Arc<dyn Transport>,
    origin: Url,
    timeout: Duration,
}

impl CatalogApi {
    pub fn new(transport: Arc<dyn Transport>, origin: Url) -> Self {
        Self {
            transport,
            origin,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build an API client over a fresh [`HttpTransport`].
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config)?;
        let origin = config.origin()?;
        Ok(Self::new(Arc::new(transport), origin).with_timeout(config.timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch one catalogue page.
    ///
    /// Paths outside `/catalog` fail with `BadUrl` without touching the network.
    pub fn fetch_catalogue_page(&self, path: &str) -> ApiCall<PageEnvelope> {
        if !is_catalog_path(path) {
            return ApiCall::failed(FetchError::bad_url(path), decode_json::<PageEnvelope>);
        }
        self.get_json(path, decode_json::<PageEnvelope>)
    }

    pub fn fetch_categories(&self) -> ApiCall<Vec<String>> {
        self.get_json(ApiPath::Categories.as_str(), decode_categories)
    }

    /// Fetch and decode an image, always from the origin.
    pub fn fetch_image(&self, url: &Url) -> ApiCall<DecodedImage> {
        let request = TransportRequest::get(url.clone())
            .accept(ACCEPT_IMAGE)
            .cache_policy(CachePolicy::ReloadIgnoringCache)
            .timeout(self.timeout);
        ApiCall::new(self.transport.get(request), DecodedImage::decode)
    }

    fn get_json<T>(&self, path: &str, decode: Decoder<T>) -> ApiCall<T> {
        let url = match compose_url(&self.origin, path) {
            Ok(url) => url,
            Err(err) => return ApiCall::failed(err, decode),
        };
        let request = TransportRequest::get(url)
            .accept(ACCEPT_JSON)
            .timeout(self.timeout);
        ApiCall::new(self.transport.get(request), decode)
    }
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FetchError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn decode_categories(bytes: &[u8]) -> Result<Vec<String>, FetchError> {
    decode_json::<CategoryEnvelope>(bytes).map(|envelope| envelope.categories)
}
