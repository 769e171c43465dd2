use std::ops::Range;

use tokio::sync::mpsc;

/// Receives incremental changes to the item index.
///
/// Callbacks run on the datasource task, after the state they describe is
/// visible through the [`Datasource`](super::Datasource) accessors. Keep them
/// short; hand work off to another task if needed.
pub trait CatalogueObserver: Send + Sync {
    /// Positions `range` were written.
    fn on_insert(&self, _range: Range<usize>) {}

    /// Page 0 was merged after a reset; previous positions are gone.
    fn on_reload(&self) {}

    /// The last page has been merged.
    fn on_load_complete(&self) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl CatalogueObserver for NoopObserver {}

/// Observer that logs every notification.
pub struct TracingObserver;

impl CatalogueObserver for TracingObserver {
    fn on_insert(&self, range: Range<usize>) {
        tracing::info!(start = range.start, end = range.end, "Items inserted");
    }

    fn on_reload(&self) {
        tracing::info!("Catalogue reloaded");
    }

    fn on_load_complete(&self) {
        tracing::info!("Catalogue fully loaded");
    }
}

/// Observer notifications as values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueEvent {
    Inserted(Range<usize>),
    Reloaded,
    LoadComplete,
}

impl CatalogueObserver for mpsc::UnboundedSender<CatalogueEvent> {
    fn on_insert(&self, range: Range<usize>) {
        let _ = self.send(CatalogueEvent::Inserted(range));
    }

    fn on_reload(&self) {
        let _ = self.send(CatalogueEvent::Reloaded);
    }

    fn on_load_complete(&self) {
        let _ = self.send(CatalogueEvent::LoadComplete);
    }
}
