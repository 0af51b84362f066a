//! Image loading and caching for Lumen
//!
//! Images are addressed by an opaque source key (a file path or a `data:`
//! URI). The [`ImageCache`] owns every loaded resource; nodes look images
//! up by key on every frame and never keep a copy, so the cache is free to
//! evict whenever it runs out of room.
//!
//! Loads are asynchronous: a miss hands the key to an [`ImageLoader`]
//! together with a one-shot completion handle, and the result is applied
//! the next time the frame loop calls [`ImageCache::poll_loads`].

pub mod cache;
pub mod error;
pub mod loader;

pub use cache::{ImageCache, ImageResource, LoadState};
pub use error::{ImageError, Result};
pub use loader::{
    DecodingLoader, DeferredLoader, ImageData, ImageLoader, ImageSource, LoadCompletion,
    PendingRequest,
};
