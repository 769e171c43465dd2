//! Paginated catalogue datasource.
//!
//! [`Datasource`] is a cloneable handle onto a background task that owns the
//! item index and pagination cursor. At most one page fetch is in flight;
//! asking for a page while another is loading cancels the older one.
//! Observers hear about inserted ranges, reloads and the end of the
//! catalogue. Images are read through the shared [`ImageCache`].

mod index;
mod observer;
mod server;
mod state;

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use crate::api::{CatalogApi, DecodedImage, Item};
use crate::cache::ImageCache;
use crate::error::FetchError;

pub use index::ItemIndex;
pub use observer::{CatalogueEvent, CatalogueObserver, NoopObserver, TracingObserver};
pub use state::{DatasourceState, PageCursor};

use server::{Command, DatasourceServer};

const COMMAND_BUFFER: usize = 32;

/// How a page request ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was merged into positions `range`.
    Merged { page: usize, range: Range<usize> },
    /// A newer request cancelled this one. Nothing changed.
    Superseded,
    /// The page is not reachable from the cursor (not the next page, or no
    /// next page exists). Nothing changed.
    Skipped,
}

/// Handle to a running datasource.
#[derive(Clone)]
pub struct Datasource {
    sender: mpsc::Sender<Command>,
    state: Arc<RwLock<DatasourceState>>,
    cache: ImageCache,
}

impl Datasource {
    /// Start the datasource task on the current tokio runtime.
    pub fn spawn(
        api: CatalogApi,
        cache: ImageCache,
        observer: Arc<dyn CatalogueObserver>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let state = Arc::new(RwLock::new(DatasourceState::default()));
        let server = DatasourceServer::new(receiver, state.clone(), api, cache.clone(), observer);
        tokio::spawn(server.run());

        Self {
            sender,
            state,
            cache,
        }
    }

    /// Request page `page`.
    ///
    /// Any fetch already in flight is cancelled first. Page 0 then resets
    /// everything and refetches from the catalogue root. Any other page must
    /// be `current_page() + 1` with a next page available, otherwise the
    /// request is `Skipped`. Cancellation is reported as
    /// `Superseded`, never as an error.
    pub async fn request_page(&self, page: usize) -> Result<PageOutcome, FetchError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(Command::RequestPage { page, respond_to }).await?;
        receiver.await.unwrap_or(Err(FetchError::Cancelled))
    }

    /// Request the page after `current_page()`.
    pub async fn request_next_page(&self) -> Result<PageOutcome, FetchError> {
        let next = self.current_page() + 1;
        self.request_page(next).await
    }

    /// Image of the item with `item_id`.
    ///
    /// `Ok(None)` means the item is not in the index yet; no request is made.
    pub async fn fetch_image(&self, item_id: &str) -> Result<Option<DecodedImage>, FetchError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(Command::FetchImage {
            item_id: item_id.to_string(),
            respond_to,
        })
        .await?;
        receiver.await.unwrap_or(Err(FetchError::Cancelled))
    }

    async fn send(&self, command: Command) -> Result<(), FetchError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| FetchError::Cancelled)
    }

    pub fn items(&self) -> BTreeMap<usize, Item> {
        self.state.read().index.snapshot()
    }

    pub fn item(&self, position: usize) -> Option<Item> {
        self.state.read().index.get(position).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().index.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.state.read().cursor.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.state.read().cursor.has_next_page()
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.state.read().index.batch_size()
    }

    pub fn total(&self) -> Option<usize> {
        self.state.read().total
    }

    pub fn is_fetching(&self) -> bool {
        self.state.read().fetching.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.state.read().is_complete()
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }
}
