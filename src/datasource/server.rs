//! The datasource task: sole writer of the index and cursor.
//!
//! Commands arrive from [`Datasource`](super::Datasource) handles. Page
//! fetches run on spawned tasks and report back through a completion
//! channel, so every state change happens on this task. Each fetch carries
//! a generation number; a completion whose generation is not the current
//! in-flight one is dropped without touching state.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use crate::api::{ApiPath, CatalogApi, DecodedImage, PageEnvelope};
use crate::cache::ImageCache;
use crate::error::FetchError;
use crate::transport::CancelToken;

use super::observer::CatalogueObserver;
use super::state::DatasourceState;
use super::PageOutcome;

pub(crate) enum Command {
    RequestPage {
        page: usize,
        respond_to: oneshot::Sender<Result<PageOutcome, FetchError>>,
    },
    FetchImage {
        item_id: String,
        respond_to: oneshot::Sender<Result<Option<DecodedImage>, FetchError>>,
    },
}

struct Completion {
    generation: u64,
    page: usize,
    result: Result<PageEnvelope, FetchError>,
}

struct InFlight {
    page: usize,
    generation: u64,
    token: CancelToken,
    respond_to: oneshot::Sender<Result<PageOutcome, FetchError>>,
}

pub(crate) struct DatasourceServer {
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    state: Arc<RwLock<DatasourceState>>,
    api: CatalogApi,
    cache: ImageCache,
    observer: Arc<dyn CatalogueObserver>,
    in_flight: Option<InFlight>,
    next_generation: u64,
}

impl DatasourceServer {
    pub(crate) fn new(
        commands: mpsc::Receiver<Command>,
        state: Arc<RwLock<DatasourceState>>,
        api: CatalogApi,
        cache: ImageCache,
        observer: Arc<dyn CatalogueObserver>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            commands,
            completions_tx,
            completions_rx,
            state,
            api,
            cache,
            observer,
            in_flight: None,
            next_generation: 0,
        }
    }

    /// Serve until every handle is dropped.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::RequestPage { page, respond_to }) => {
                        self.request_page(page, respond_to);
                    }
                    Some(Command::FetchImage { item_id, respond_to }) => {
                        self.fetch_image(item_id, respond_to);
                    }
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.complete(completion);
                }
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.token.cancel();
        }
        tracing::debug!("Datasource stopped");
    }

    fn request_page(
        &mut self,
        page: usize,
        respond_to: oneshot::Sender<Result<PageOutcome, FetchError>>,
    ) {
        self.supersede_in_flight(page);

        let path = if page == 0 {
            self.state.write().reset();
            ApiPath::Catalog.as_str().to_string()
        } else {
            let resolved = {
                let state = self.state.read();
                state.cursor.path_for(page)
            };
            match resolved {
                Some(path) => path,
                None => {
                    tracing::debug!(page, "Page not reachable from cursor, skipping");
                    if respond_to.send(Ok(PageOutcome::Skipped)).is_err() {
                        tracing::trace!("Datasource: RequestPage response dropped (receiver gone)");
                    }
                    return;
                }
            }
        };

        let call = self.api.fetch_catalogue_page(&path);
        let token = call.cancel_token();
        let generation = self.next_generation;
        self.next_generation += 1;

        tracing::debug!(page, path = %path, generation, "Fetching page");

        self.state.write().fetching = Some(page);
        self.in_flight = Some(InFlight {
            page,
            generation,
            token,
            respond_to,
        });

        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = call.wait().await;
            let _ = completions.send(Completion {
                generation,
                page,
                result,
            });
        });
    }

    fn supersede_in_flight(&mut self, new_page: usize) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        tracing::debug!(
            superseded_page = in_flight.page,
            new_page,
            "Cancelling in-flight page fetch"
        );
        in_flight.token.cancel();
        self.state.write().fetching = None;
        if in_flight.respond_to.send(Ok(PageOutcome::Superseded)).is_err() {
            tracing::trace!("Datasource: superseded response dropped (receiver gone)");
        }
    }

    fn complete(&mut self, completion: Completion) {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == completion.generation);
        if !is_current {
            tracing::trace!(
                page = completion.page,
                generation = completion.generation,
                "Dropping stale page completion"
            );
            return;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        self.state.write().fetching = None;

        let outcome = match completion.result {
            Ok(envelope) => Ok(self.merge(completion.page, envelope)),
            Err(FetchError::Cancelled) => Ok(PageOutcome::Superseded),
            Err(err) => {
                tracing::warn!(
                    page = completion.page,
                    kind = err.kind(),
                    error = %err,
                    "Page fetch failed"
                );
                Err(err)
            }
        };

        if in_flight.respond_to.send(outcome).is_err() {
            tracing::trace!("Datasource: RequestPage response dropped (receiver gone)");
        }
    }

    fn merge(&mut self, page: usize, envelope: PageEnvelope) -> PageOutcome {
        let (range, complete) = {
            let mut state = self.state.write();
            state.cursor.current_page = page;
            let range = state.index.merge(page, envelope.items);
            state.cursor.next_locator = envelope.next;
            state.total = Some(envelope.total);
            (range, !state.cursor.has_next_page())
        };

        tracing::debug!(
            page,
            start = range.start,
            end = range.end,
            complete,
            "Page merged"
        );

        if page == 0 {
            self.observer.on_reload();
        }
        if !range.is_empty() {
            self.observer.on_insert(range.clone());
        }
        if complete {
            self.observer.on_load_complete();
        }

        PageOutcome::Merged { page, range }
    }

    fn fetch_image(
        &self,
        item_id: String,
        mut respond_to: oneshot::Sender<Result<Option<DecodedImage>, FetchError>>,
    ) {
        let url = self.state.read().index.image_url_for(&item_id);
        let Some(url) = url else {
            tracing::trace!(item_id = %item_id, "Image requested for unknown item");
            let _ = respond_to.send(Ok(None));
            return;
        };

        if let Some(image) = self.cache.get(&url) {
            let _ = respond_to.send(Ok(Some(image)));
            return;
        }

        let call = self.api.fetch_image(&url);
        let token = call.cancel_token();
        let cache = self.cache.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                result = call.wait() => result,
                _ = respond_to.closed() => {
                    token.cancel();
                    return;
                }
            };

            let result = result.map(|image| {
                cache.insert(&url, image.clone());
                Some(image)
            });
            if let Err(err) = &result {
                tracing::debug!(url = %url, kind = err.kind(), error = %err, "Image fetch failed");
            }
            let _ = respond_to.send(result);
        });
    }
}
