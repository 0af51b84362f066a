//! Render configuration
//!
//! Defaults that the style resolver, image cache and layout pass fall back
//! to. Every field is optional in the TOML form:
//!
//! ```toml
//! image_cache_capacity = 300
//!
//! [viewport]
//! width = 1280
//! height = 1024
//!
//! [text]
//! font_size = 16
//! line_height = 18
//! text_align = "left"
//! color = "#000"
//! font_family = "sans-serif"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Color, FontFace, Size, TextAlign};

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`RenderConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its accepted range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Defaults applied to text nodes that do not declare their own values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub font_size: f32,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub color: Color,
    pub font_family: String,
}

impl TextDefaults {
    /// Font descriptor for the default family
    pub fn font_face(&self) -> FontFace {
        FontFace::new(self.font_family.clone())
    }
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 18.0,
            text_align: TextAlign::Left,
            color: Color::BLACK,
            font_family: FontFace::DEFAULT_FAMILY.to_string(),
        }
    }
}

/// Size used for the root layout when the root declares none
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl ViewportConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 1024.0,
        }
    }
}

/// Top-level render configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum number of entries held by the image cache
    pub image_cache_capacity: usize,
    /// Fallback root size
    pub viewport: ViewportConfig,
    /// Text node defaults
    pub text: TextDefaults,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_cache_capacity: 300,
            viewport: ViewportConfig::default(),
            text: TextDefaults::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.image_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "image_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.text.font_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "text.font_size",
                reason: format!("must be positive, got {}", self.text.font_size),
            });
        }
        Ok(())
    }

    /// Set the image cache capacity
    pub fn with_image_cache_capacity(mut self, capacity: usize) -> Self {
        self.image_cache_capacity = capacity;
        self
    }

    /// Set the fallback viewport
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = ViewportConfig { width, height };
        self
    }

    /// Replace the text defaults
    pub fn with_text_defaults(mut self, text: TextDefaults) -> Self {
        self.text = text;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.image_cache_capacity, 300);
        assert_eq!(config.text.font_size, 16.0);
        assert_eq!(config.text.line_height, 18.0);
        assert_eq!(config.text.text_align, TextAlign::Left);
        assert_eq!(config.text.color, Color::BLACK);
    }

    #[test]
    fn test_partial_toml() {
        let config = RenderConfig::from_toml_str(
            r##"
            image_cache_capacity = 8

            [text]
            text_align = "center"
            color = "#ff0000"
            "##,
        )
        .unwrap();

        assert_eq!(config.image_cache_capacity, 8);
        assert_eq!(config.text.text_align, TextAlign::Center);
        assert_eq!(config.text.color, Color::RED);
        assert_eq!(config.text.font_size, 16.0);
        assert_eq!(config.viewport, ViewportConfig::default());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = RenderConfig::from_toml_str("image_cache_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "image_cache_capacity", .. }));
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = RenderConfig::from_toml_str("[text]\ncolor = \"nope\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
