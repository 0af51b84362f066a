//! Image error types

use thiserror::Error;

/// Image loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Failed to read an image file
    #[error("Failed to load image file: {0}")]
    FileLoad(String),

    /// Bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Invalid base64 payload or data URI
    #[error("Invalid base64 image data: {0}")]
    Base64(String),

    /// Remote sources are not fetched by the built-in loaders
    #[error("Network image sources are not supported: {0}")]
    Network(String),

    /// The loader went away without completing the request
    #[error("Image load was abandoned by the loader")]
    Abandoned,
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for ImageError {
    fn from(err: base64::DecodeError) -> Self {
        ImageError::Base64(err.to_string())
    }
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;
