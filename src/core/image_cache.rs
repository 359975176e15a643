//! Channel logo cache with request coalescing.
//!
//! Each logo key moves from absent to `Pending` when first requested, then to
//! `Ready` or `Failed` when its fetch completes. Only the absent to `Pending`
//! transition issues a fetch, so a key never has two fetches in flight.
//! Entries are only removed all at once by [`ImageCache::clear`].

use std::collections::HashMap;

use tracing::{debug, warn};

use super::error::LogoFetchError;

/// Asynchronous logo source.
///
/// `fetch` must return immediately; the result is handed back later through
/// [`ImageCache::complete`] on the thread that owns the cache.
pub trait LogoFetcher {
    fn fetch(&self, key: &str, target_width: u32, target_height: u32);
}

/// Pixel size of a decoded logo, used to keep its aspect ratio.
pub trait LogoImage {
    fn size(&self) -> (u32, u32);
}

/// Cache state of one logo key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoState<I> {
    Pending,
    Ready(I),
    Failed,
}

/// Logo images keyed by their identifier.
#[derive(Debug)]
pub struct ImageCache<I> {
    entries: HashMap<String, LogoState<I>>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<I> ImageCache<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The image for `key` if it is loaded; otherwise start loading it.
    ///
    /// Pending and failed keys return `None` without issuing another fetch.
    pub fn get_or_request(
        &mut self,
        key: &str,
        target_width: u32,
        target_height: u32,
        fetcher: &dyn LogoFetcher,
    ) -> Option<&I> {
        if key.is_empty() {
            return None;
        }
        if !self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), LogoState::Pending);
            debug!(key, target_width, target_height, "requesting logo");
            fetcher.fetch(key, target_width, target_height);
        }
        match self.entries.get(key) {
            Some(LogoState::Ready(image)) => Some(image),
            _ => None,
        }
    }

    /// Record the outcome of a fetch.
    ///
    /// Results for keys that are not pending (for example after a clear) are
    /// dropped. Returns whether the cache changed.
    pub fn complete(&mut self, key: &str, result: Result<I, LogoFetchError>) -> bool {
        let Some(state) = self.entries.get_mut(key) else {
            debug!(key, "dropping logo for a cleared cache");
            return false;
        };
        if !matches!(state, LogoState::Pending) {
            return false;
        }

        *state = match result {
            Ok(image) => LogoState::Ready(image),
            Err(e) => {
                warn!("logo unavailable: {e}");
                LogoState::Failed
            }
        };
        true
    }

    /// Number of logos requested but not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|state| matches!(state, LogoState::Pending))
            .count()
    }

    /// Number of keys with any state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry, including pending ones.
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "clearing logo cache");
        self.entries.clear();
    }
}

#[cfg(test)]
impl<I> ImageCache<I> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, key: &str) -> Option<&LogoState<I>> {
        self.entries.get(key)
    }
}
