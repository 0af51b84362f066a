//! Text measurement
//!
//! Provides a trait for measuring the rendered width of a run of text.
//! Line breaking calls it for every candidate line, so implementations
//! should be cheap or cache internally.

use lumen_core::FontFace;

/// Trait for measuring text width
///
/// Implement this trait with a real shaper for accurate layout. Without
/// one, [`EstimatedTextMeasurer`] provides approximate sizes.
pub trait TextMeasurer {
    /// Width in pixels of `text` drawn on a single line
    fn measure(&self, text: &str, font: &FontFace, font_size: f32) -> f32;
}

/// A text measurer that uses estimates
///
/// ~0.55 × font size per character, a conservative average for
/// proportional fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTextMeasurer;

impl TextMeasurer for EstimatedTextMeasurer {
    fn measure(&self, text: &str, _font: &FontFace, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.55
    }
}

/// Every character advances by the same number of pixels
///
/// Deterministic; used for monospace backends and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasurer {
    pub advance: f32,
}

impl FixedAdvanceMeasurer {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, _font: &FontFace, _font_size: f32) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_scales_with_size() {
        let face = FontFace::default();
        let small = EstimatedTextMeasurer.measure("hello", &face, 10.0);
        let large = EstimatedTextMeasurer.measure("hello", &face, 20.0);
        assert!((small - 27.5).abs() < 1e-4);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn test_fixed_advance_counts_chars() {
        let m = FixedAdvanceMeasurer::new(10.0);
        assert_eq!(m.measure("héllo", &FontFace::default(), 16.0), 50.0);
        assert_eq!(m.measure("", &FontFace::default(), 16.0), 0.0);
    }
}
