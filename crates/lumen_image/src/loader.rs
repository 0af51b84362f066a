//! Image loading and decoded image data

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use base64::Engine;
use image::{DynamicImage, GenericImageView};
use tokio::sync::oneshot;

use lumen_core::ImageRef;

use crate::error::{ImageError, Result};

/// Decoded image data ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pixels: Vec<u8>,
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
}

impl ImageData {
    /// Create ImageData from raw RGBA pixels
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected_len = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected_len {
            return Err(ImageError::Decode(format!(
                "Invalid pixel data length: expected {}, got {}",
                expected_len,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Load an image from a source (synchronous)
    pub fn load(source: ImageSource) -> Result<Self> {
        match source {
            ImageSource::File(path) => {
                let data = std::fs::read(&path)
                    .map_err(|e| ImageError::FileLoad(format!("{}: {}", path.display(), e)))?;
                Self::from_bytes(&data)
            }
            ImageSource::Base64(data) => Self::from_base64(&data),
            ImageSource::Url(url) => Err(ImageError::Network(url)),
        }
    }

    /// Decode image from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)?;
        Ok(Self::from_dynamic_image(img))
    }

    /// Decode image from base64 string
    ///
    /// Supports both plain base64 and data URIs like:
    /// - `iVBORw0KGgo...` (plain base64)
    /// - `data:image/png;base64,iVBORw0KGgo...` (data URI)
    pub fn from_base64(data: &str) -> Result<Self> {
        let base64_data = if data.starts_with("data:") {
            data.find(";base64,")
                .map(|pos| &data[pos + 8..])
                .ok_or_else(|| ImageError::Base64("Invalid data URI format".to_string()))?
        } else {
            data
        };

        let bytes = base64::engine::general_purpose::STANDARD.decode(base64_data)?;
        Self::from_bytes(&bytes)
    }

    fn from_dynamic_image(img: DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.to_rgba8().into_raw();

        Self {
            pixels,
            width,
            height,
        }
    }

    /// Get the raw RGBA pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get the image width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get image dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Borrow as a drawable image for the given source key
    pub fn as_image_ref<'a>(&'a self, key: &'a str) -> ImageRef<'a> {
        ImageRef {
            key,
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

/// Where an image source key points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A filesystem path
    File(PathBuf),
    /// A `data:` URI or raw base64 payload
    Base64(String),
    /// An `http(s)://` URL
    Url(String),
}

impl ImageSource {
    /// Interpret a cache key
    pub fn from_key(key: &str) -> Self {
        if key.starts_with("data:") {
            ImageSource::Base64(key.to_string())
        } else if key.starts_with("http://") || key.starts_with("https://") {
            ImageSource::Url(key.to_string())
        } else {
            ImageSource::File(PathBuf::from(key))
        }
    }
}

/// One-shot handle a loader uses to report the outcome of a request
///
/// Completing after the requesting cache entry was evicted is harmless:
/// the result is dropped.
#[derive(Debug)]
pub struct LoadCompletion {
    key: String,
    sender: oneshot::Sender<Result<ImageData>>,
}

impl LoadCompletion {
    /// Create a completion handle and the receiver the cache polls
    pub fn channel(key: impl Into<String>) -> (Self, oneshot::Receiver<Result<ImageData>>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                key: key.into(),
                sender,
            },
            receiver,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Deliver the load result
    pub fn complete(self, result: Result<ImageData>) {
        if self.sender.send(result).is_err() {
            tracing::trace!("Image {} finished after its cache entry was evicted", self.key);
        }
    }
}

/// Starts asynchronous image loads
///
/// `request` must return immediately; the outcome is delivered later
/// through the completion handle.
pub trait ImageLoader {
    fn request(&mut self, key: &str, completion: LoadCompletion);
}

/// Decodes files and data URIs on a background thread
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodingLoader;

impl ImageLoader for DecodingLoader {
    fn request(&mut self, key: &str, completion: LoadCompletion) {
        let source = ImageSource::from_key(key);
        std::thread::spawn(move || {
            let result = ImageData::load(source);
            if let Err(ref e) = result {
                tracing::debug!("Image {} failed to load: {}", completion.key(), e);
            }
            completion.complete(result);
        });
    }
}

/// A load request waiting for the host to fulfil it
#[derive(Debug)]
pub struct PendingRequest {
    pub key: String,
    pub completion: LoadCompletion,
}

impl PendingRequest {
    pub fn complete(self, result: Result<ImageData>) {
        self.completion.complete(result);
    }
}

/// Queues requests for the host to fulfil
///
/// Useful when images are decoded by the platform (or fetched over a
/// network stack Lumen doesn't own): the host drains the queue with
/// [`DeferredLoader::take_requests`] and completes each one when ready.
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct DeferredLoader {
    queue: Rc<RefCell<Vec<PendingRequest>>>,
}

impl DeferredLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request issued since the last call
    pub fn take_requests(&self) -> Vec<PendingRequest> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl ImageLoader for DeferredLoader {
    fn request(&mut self, key: &str, completion: LoadCompletion) {
        self.queue.borrow_mut().push(PendingRequest {
            key: key.to_string(),
            completion,
        });
    }
}
