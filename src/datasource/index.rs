use std::collections::BTreeMap;
use std::ops::Range;

use reqwest::Url;

use crate::api::Item;

/// Sparse, position-keyed item store.
///
/// The batch size is taken from the first page merged into an empty index
/// and stays fixed until the index is cleared. Page `p` always lands at
/// `p * batch_size`, so merging the same page twice overwrites in place.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    items: BTreeMap<usize, Item>,
    batch_size: Option<usize>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `items` as page `page` and return the positions written.
    ///
    /// An empty page 0 leaves the batch size to the next page merged into
    /// the still-empty index, so that page lands at `page * len`, not at 0.
    pub fn merge(&mut self, page: usize, items: Vec<Item>) -> Range<usize> {
        if self.items.is_empty() {
            self.batch_size = Some(items.len());
        }
        let batch_size = self.batch_size.unwrap_or(items.len());

        let min_index = page * batch_size;
        let end = min_index + items.len();

        for (offset, item) in items.into_iter().enumerate() {
            self.items.insert(min_index + offset, item);
        }

        min_index..end
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.batch_size = None;
    }

    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get(&position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.items.iter().map(|(position, item)| (*position, item))
    }

    /// Image URL of the item with `id`, if it has been loaded.
    pub fn image_url_for(&self, id: &str) -> Option<Url> {
        self.items
            .values()
            .find(|item| item.id == id)
            .map(|item| item.image.clone())
    }

    /// Whether positions `0..len` are all populated.
    pub fn is_contiguous(&self) -> bool {
        self.items
            .keys()
            .enumerate()
            .all(|(expected, position)| expected == *position)
    }

    pub fn snapshot(&self) -> BTreeMap<usize, Item> {
        self.items.clone()
    }
}
