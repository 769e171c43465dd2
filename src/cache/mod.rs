//! In-memory image cache keyed by normalized image URL.
//!
//! One cache is built at the composition root and handed to every component
//! that needs it. Entries are only ever added by the core; the whole cache is
//! dropped through [`ImageCache::evict_all`] when the host signals memory
//! pressure.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Url;

use crate::api::DecodedImage;

/// Shared handle to the image cache. Clones see the same entries.
#[derive(Clone, Default)]
pub struct ImageCache {
    inner: Arc<RwLock<HashMap<String, DecodedImage>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for `url`: the absolute URL without its fragment.
    pub fn key_for(url: &Url) -> String {
        let mut url = url.clone();
        url.set_fragment(None);
        url.into()
    }

    pub fn get(&self, url: &Url) -> Option<DecodedImage> {
        let key = Self::key_for(url);
        let hit = self.inner.read().get(&key).cloned();
        tracing::trace!(key = %key, hit = hit.is_some(), "Image cache lookup");
        hit
    }

    pub fn insert(&self, url: &Url, image: DecodedImage) {
        self.inner.write().insert(Self::key_for(url), image);
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.inner.read().contains_key(&Self::key_for(url))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop every entry. Returns how many were evicted.
    pub fn evict_all(&self) -> usize {
        let evicted = {
            let mut entries = self.inner.write();
            let count = entries.len();
            entries.clear();
            count
        };
        tracing::info!(evicted, "Image cache evicted");
        evicted
    }
}
