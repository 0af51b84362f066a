//! Text layout for Lumen
//!
//! This crate provides:
//! - Font readiness queries (fonts load asynchronously elsewhere)
//! - Text measurement (pluggable, with an estimating default)
//! - Line breaking into per-line metrics
//! - Ellipsis truncation for lines that are cut off
//!
//! Glyph shaping and rasterization are not done here: a [`TextMeasurer`]
//! backed by a real shaper can be plugged in at runtime.

pub mod font;
pub mod layout;
pub mod measure;

pub use font::{AlwaysReady, FontReadiness, FontSet};
pub use layout::{
    break_lines, truncate_with_ellipsis, Line, TextLayoutAdapter, TextLayoutRequest, TextMetrics,
    ELLIPSIS,
};
pub use measure::{EstimatedTextMeasurer, FixedAdvanceMeasurer, TextMeasurer};

pub use lumen_core::{FontFace, FontStyle, FontWeight};
