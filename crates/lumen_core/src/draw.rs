//! Drawing surface capability
//!
//! [`DrawSurface`] is the canvas-like API the paint pipeline issues its
//! commands against. Lumen does not rasterize anything itself: a platform
//! backend (a 2D canvas, Skia, a GPU batcher) implements this trait, and
//! [`crate::RecordingSurface`] implements it for tests and headless runs.
//!
//! State is saved and restored as a stack, the same way a 2D canvas does:
//!
//! ```ignore
//! fn paint(surface: &mut dyn DrawSurface) {
//!     surface.scoped(|s| {
//!         s.multiply_alpha(0.5);
//!         s.translate(10.0, 0.0);
//!         s.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), Color::RED);
//!     });
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Color, Point, Rect, Size};

/// Identifies the drawing surface a scene paints onto
///
/// Only the root node of a scene carries one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Horizontal text alignment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font weight variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS numeric weight
    pub fn to_number(self) -> u16 {
        match self {
            FontWeight::Light => 300,
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

/// Font style (normal or italic)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font descriptor: which font a text run should be drawn with
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFace {
    pub family: String,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub style: FontStyle,
}

impl FontFace {
    /// The default system font
    pub const DEFAULT_FAMILY: &'static str = "sans-serif";

    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for FontFace {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAMILY)
    }
}

/// Text style for a single `fill_text` call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontFace,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            font: FontFace::default(),
            size,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_font(mut self, font: FontFace) -> Self {
        self.font = font;
        self
    }
}

/// Borrowed view of a decoded image handed to [`DrawSurface::draw_image`]
#[derive(Clone, Copy, Debug)]
pub struct ImageRef<'a> {
    /// Source key the image was loaded from
    pub key: &'a str,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// Raw RGBA pixels
    pub pixels: &'a [u8],
}

/// The 2D drawing capability consumed by the paint pipeline
///
/// Coordinates are in surface pixels, relative to the current translation.
pub trait DrawSurface {
    /// Size of the drawable area
    fn viewport_size(&self) -> Size;

    /// Push a copy of the current translation and alpha
    fn save(&mut self);

    /// Pop back to the most recently saved state
    fn restore(&mut self);

    /// Offset all subsequent drawing
    fn translate(&mut self, dx: f32, dy: f32);

    /// Multiply the current global alpha
    fn multiply_alpha(&mut self, alpha: f32);

    /// Reset a region to transparent
    fn clear_rect(&mut self, rect: Rect);

    /// Fill a rectangle with a solid color
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a run of text with its baseline starting at `origin`
    fn fill_text(&mut self, text: &str, origin: Point, style: &TextStyle);

    /// Draw the `src` region of an image scaled into `dst`
    fn draw_image(&mut self, image: ImageRef<'_>, src: Rect, dst: Rect);
}

/// Convenience helpers available on every [`DrawSurface`]
pub trait DrawSurfaceExt: DrawSurface {
    /// Run `f` between a `save` and a matching `restore`
    ///
    /// The restore happens on every return path of `f`, so pushes and pops
    /// can never get out of balance.
    fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let result = f(self);
        self.restore();
        result
    }
}

impl<T: DrawSurface + ?Sized> DrawSurfaceExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_face_defaults() {
        let face = FontFace::default();
        assert_eq!(face.family, FontFace::DEFAULT_FAMILY);
        assert_eq!(face.weight.to_number(), 400);
        assert_eq!(face.style, FontStyle::Normal);
    }

    #[test]
    fn test_text_style_builder() {
        let style = TextStyle::new(12.0)
            .with_color(Color::RED)
            .with_font(FontFace::new("Inter").with_weight(FontWeight::Bold));
        assert_eq!(style.size, 12.0);
        assert_eq!(style.color, Color::RED);
        assert_eq!(style.font.weight, FontWeight::Bold);
    }
}
