//! Lumen Core
//!
//! Foundational types shared by every Lumen crate:
//!
//! - **Geometry**: points, sizes and rectangles in surface coordinates
//! - **Colors**: RGBA colors with CSS-style parsing
//! - **Draw Surface**: the 2D drawing capability the paint pipeline targets
//! - **Configuration**: render defaults loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{Color, DrawSurface, DrawSurfaceExt, Rect, RecordingSurface, Size};
//!
//! let mut surface = RecordingSurface::new(Size::new(800.0, 600.0));
//!
//! surface.scoped(|s| {
//!     s.translate(10.0, 10.0);
//!     s.fill_rect(Rect::new(0.0, 0.0, 50.0, 25.0), Color::BLUE);
//! });
//!
//! assert_eq!(surface.draw_count(), 1);
//! ```

pub mod color;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod recording;

pub use color::{Color, ColorParseError};
pub use config::{ConfigError, RenderConfig, TextDefaults, ViewportConfig};
pub use draw::{
    DrawSurface, DrawSurfaceExt, FontFace, FontStyle, FontWeight, ImageRef, SurfaceId, TextAlign,
    TextStyle,
};
pub use geometry::{Point, Rect, Size};
pub use recording::{DrawCommand, RecordingSurface, SurfaceState};
