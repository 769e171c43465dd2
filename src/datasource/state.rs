use crate::api::resolve_locator;

use super::index::ItemIndex;

/// Next-only pagination cursor.
#[derive(Debug, Clone, Default)]
pub struct PageCursor {
    pub current_page: usize,
    /// Locator of the page after `current_page`; `None` once the last page is in.
    pub next_locator: Option<String>,
}

impl PageCursor {
    pub fn has_next_page(&self) -> bool {
        self.next_locator.is_some()
    }

    /// Request path for a non-zero `page`.
    ///
    /// Only `current_page + 1` is reachable, and only while a next locator
    /// exists. Everything else yields `None`.
    pub fn path_for(&self, page: usize) -> Option<String> {
        if page != self.current_page + 1 {
            return None;
        }
        self.next_locator.as_deref().map(resolve_locator)
    }
}

/// Everything the datasource exposes to readers.
///
/// Written only by the datasource task; handles take read locks.
#[derive(Debug, Default)]
pub struct DatasourceState {
    pub index: ItemIndex,
    pub cursor: PageCursor,
    /// `total` reported by the most recent page.
    pub total: Option<usize>,
    /// Page currently being fetched.
    pub fetching: Option<usize>,
}

impl DatasourceState {
    pub fn reset(&mut self) {
        self.index.clear();
        self.cursor = PageCursor::default();
        self.total = None;
    }

    /// No further pages and every reported item is present.
    pub fn is_complete(&self) -> bool {
        !self.cursor.has_next_page() && self.total == Some(self.index.len())
    }
}
