//! Bounded image resource cache
//!
//! Entries are evicted least-frequently-used: every hit bumps a per-entry
//! counter that is never decayed, and when the table is full the entry
//! with the lowest counter goes (ties broken arbitrarily). An image that
//! was popular long ago outlives one that was used once a moment ago.

use rustc_hash::FxHashMap;
use tokio::sync::oneshot::{self, error::TryRecvError};

use lumen_core::{ImageRef, RenderConfig};

use crate::error::{ImageError, Result};
use crate::loader::{ImageData, ImageLoader, LoadCompletion};

/// Default number of entries the cache holds
pub const DEFAULT_CAPACITY: usize = 300;

/// Load state of a cached image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Errored,
}

enum ResourceState {
    Pending(oneshot::Receiver<Result<ImageData>>),
    Loaded(ImageData),
    Errored(ImageError),
}

/// A cached image, owned by the [`ImageCache`]
///
/// Width and height are only known once the image is loaded.
pub struct ImageResource {
    key: String,
    state: ResourceState,
}

impl ImageResource {
    fn pending(key: &str, receiver: oneshot::Receiver<Result<ImageData>>) -> Self {
        Self {
            key: key.to_string(),
            state: ResourceState::Pending(receiver),
        }
    }

    /// The source key this resource was requested with
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> LoadState {
        match self.state {
            ResourceState::Pending(_) => LoadState::Pending,
            ResourceState::Loaded(_) => LoadState::Loaded,
            ResourceState::Errored(_) => LoadState::Errored,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ResourceState::Loaded(_))
    }

    /// Natural width in pixels, once loaded
    pub fn width(&self) -> Option<u32> {
        self.data().map(|d| d.width())
    }

    /// Natural height in pixels, once loaded
    pub fn height(&self) -> Option<u32> {
        self.data().map(|d| d.height())
    }

    pub fn data(&self) -> Option<&ImageData> {
        match &self.state {
            ResourceState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ImageError> {
        match &self.state {
            ResourceState::Errored(err) => Some(err),
            _ => None,
        }
    }

    /// Drawable view of the image, once loaded
    pub fn as_image_ref(&self) -> Option<ImageRef<'_>> {
        self.data().map(|d| d.as_image_ref(&self.key))
    }

    /// Apply a finished load, if any. Returns true on a state change.
    fn poll(&mut self) -> bool {
        let ResourceState::Pending(receiver) = &mut self.state else {
            return false;
        };

        let next = match receiver.try_recv() {
            Ok(Ok(data)) => {
                tracing::debug!(
                    "Image {} loaded ({}x{})",
                    self.key,
                    data.width(),
                    data.height()
                );
                ResourceState::Loaded(data)
            }
            Ok(Err(err)) => {
                tracing::debug!("Image {} errored: {}", self.key, err);
                ResourceState::Errored(err)
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => {
                tracing::debug!("Image {} abandoned by loader", self.key);
                ResourceState::Errored(ImageError::Abandoned)
            }
        };

        self.state = next;
        true
    }
}

impl std::fmt::Debug for ImageResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResource")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

struct CacheEntry {
    resource: ImageResource,
    use_count: u64,
}

/// Capacity-bounded table of image resources keyed by source
pub struct ImageCache {
    capacity: usize,
    entries: FxHashMap<String, CacheEntry>,
    loader: Box<dyn ImageLoader>,
}

impl ImageCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize, loader: impl ImageLoader + 'static) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: FxHashMap::default(),
            loader: Box::new(loader),
        }
    }

    /// Create a cache sized from the render configuration
    pub fn from_config(config: &RenderConfig, loader: impl ImageLoader + 'static) -> Self {
        Self::new(config.image_cache_capacity, loader)
    }

    /// Look up an image, starting a load on a miss
    ///
    /// A hit increments the entry's use count. A miss evicts first when the
    /// table is full, then inserts a pending entry with a use count of 0.
    pub fn get(&mut self, key: &str) -> &ImageResource {
        let hit = match self.entries.get_mut(key) {
            Some(entry) => {
                entry.use_count += 1;
                true
            }
            None => false,
        };

        if !hit {
            if self.entries.len() >= self.capacity {
                self.evict_least_used();
            }

            tracing::debug!("Image cache miss: {}", key);
            let (completion, receiver) = LoadCompletion::channel(key);
            self.loader.request(key, completion);
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    resource: ImageResource::pending(key, receiver),
                    use_count: 0,
                },
            );
        }

        &self.entries[key].resource
    }

    /// Look up an image without counting a use or starting a load
    pub fn peek(&self, key: &str) -> Option<&ImageResource> {
        self.entries.get(key).map(|e| &e.resource)
    }

    pub fn state(&self, key: &str) -> Option<LoadState> {
        self.peek(key).map(ImageResource::state)
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.peek(key).is_some_and(ImageResource::is_loaded)
    }

    pub fn use_count(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|e| e.use_count)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop an entry explicitly
    pub fn remove(&mut self, key: &str) -> Option<ImageResource> {
        self.entries.remove(key).map(|e| e.resource)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Apply every load that finished since the last poll
    ///
    /// Returns how many entries left the pending state.
    pub fn poll_loads(&mut self) -> usize {
        self.entries
            .values_mut()
            .filter(|entry| entry.resource.state() == LoadState::Pending)
            .map(|entry| entry.resource.poll())
            .filter(|changed| *changed)
            .count()
    }

    fn evict_least_used(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.use_count)
            .map(|(key, entry)| (key.clone(), entry.use_count));

        if let Some((key, use_count)) = victim {
            tracing::debug!("Evicting image {} (use count {})", key, use_count);
            self.entries.remove(&key);
        }
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DecodingLoader, DeferredLoader};

    const RED_PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn rgba(width: u32, height: u32) -> ImageData {
        ImageData::from_rgba(vec![0; (width * height * 4) as usize], width, height).unwrap()
    }

    #[test]
    fn test_miss_then_hit_counts_uses() {
        let mut cache = ImageCache::new(4, DeferredLoader::new());
        assert_eq!(cache.get("a").state(), LoadState::Pending);
        assert_eq!(cache.use_count("a"), Some(0));

        cache.get("a");
        cache.get("a");
        assert_eq!(cache.use_count("a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss_requests_exactly_one_load() {
        let loader = DeferredLoader::new();
        let mut cache = ImageCache::new(4, loader.clone());
        cache.get("a");
        cache.get("a");
        assert_eq!(loader.pending_count(), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = ImageCache::new(3, DeferredLoader::new());
        for i in 0..20 {
            cache.get(&format!("img-{i}"));
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_evicts_lowest_use_count() {
        let mut cache = ImageCache::new(3, DeferredLoader::new());
        cache.get("a");
        cache.get("b");
        cache.get("c");
        cache.get("a");
        cache.get("a");
        cache.get("b");

        // a=2, b=1, c=0
        cache.get("d");
        assert!(!cache.contains("c"));
        assert!(cache.contains("a") && cache.contains("b") && cache.contains("d"));

        // a=2, b=1, d=0
        cache.get("c");
        assert!(!cache.contains("d"));
    }

    #[test]
    fn test_frequency_beats_recency() {
        let mut cache = ImageCache::new(2, DeferredLoader::new());
        cache.get("old");
        for _ in 0..5 {
            cache.get("old");
        }
        cache.get("recent");
        cache.get("recent");

        // "recent" was used last but has the lower count
        cache.get("new");
        assert!(cache.contains("old"));
        assert!(!cache.contains("recent"));
    }

    #[test]
    fn test_pending_to_loaded() {
        let loader = DeferredLoader::new();
        let mut cache = ImageCache::new(4, loader.clone());
        cache.get("a.png");
        assert!(!cache.is_loaded("a.png"));
        assert_eq!(cache.get("a.png").width(), None);

        for request in loader.take_requests() {
            request.complete(Ok(rgba(4, 2)));
        }
        assert_eq!(cache.state("a.png"), Some(LoadState::Pending));
        assert_eq!(cache.poll_loads(), 1);

        let resource = cache.get("a.png");
        assert!(resource.is_loaded());
        assert_eq!((resource.width(), resource.height()), (Some(4), Some(2)));
        assert_eq!(resource.key(), "a.png");
        assert!(resource.as_image_ref().is_some());
    }

    #[test]
    fn test_pending_to_errored_is_terminal() {
        let loader = DeferredLoader::new();
        let mut cache = ImageCache::new(4, loader.clone());
        cache.get("broken.png");
        for request in loader.take_requests() {
            request.complete(Err(ImageError::Decode("bad bytes".into())));
        }
        cache.poll_loads();

        assert_eq!(cache.state("broken.png"), Some(LoadState::Errored));
        assert_eq!(
            cache.peek("broken.png").and_then(ImageResource::error),
            Some(&ImageError::Decode("bad bytes".into()))
        );
        // No retry on later access
        cache.get("broken.png");
        assert_eq!(loader.pending_count(), 0);
        assert_eq!(cache.poll_loads(), 0);
        assert_eq!(cache.state("broken.png"), Some(LoadState::Errored));
    }

    #[test]
    fn test_dropped_completion_errors() {
        let loader = DeferredLoader::new();
        let mut cache = ImageCache::new(4, loader.clone());
        cache.get("a.png");
        drop(loader.take_requests());
        cache.poll_loads();
        assert_eq!(cache.peek("a.png").and_then(ImageResource::error), Some(&ImageError::Abandoned));
    }

    #[test]
    fn test_completion_after_eviction_is_dropped() {
        let loader = DeferredLoader::new();
        let mut cache = ImageCache::new(1, loader.clone());
        cache.get("first.png");
        cache.get("second.png");
        assert!(!cache.contains("first.png"));

        for request in loader.take_requests() {
            request.complete(Ok(rgba(1, 1)));
        }
        assert_eq!(cache.poll_loads(), 1);
        assert!(cache.is_loaded("second.png"));
        assert!(!cache.contains("first.png"));
    }

    #[test]
    fn test_decoding_loader_completes_asynchronously() {
        let mut cache = ImageCache::new(4, DecodingLoader);
        cache.get(RED_PIXEL_PNG);

        let mut attempts = 0;
        while cache.poll_loads() == 0 && attempts < 400 {
            std::thread::sleep(std::time::Duration::from_millis(5));
            attempts += 1;
        }

        assert!(cache.is_loaded(RED_PIXEL_PNG));
        assert_eq!(cache.peek(RED_PIXEL_PNG).and_then(ImageResource::width), Some(1));
    }

    #[test]
    fn test_from_config_capacity() {
        let config = RenderConfig::default().with_image_cache_capacity(7);
        let cache = ImageCache::from_config(&config, DeferredLoader::new());
        assert_eq!(cache.capacity(), 7);
    }
}
