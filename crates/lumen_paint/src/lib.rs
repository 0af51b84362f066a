//! Lumen Paint Pipeline
//!
//! Turns the retained scene tree into drawing commands once per frame:
//! apply finished image loads, lay out the whole tree, clear the surface to
//! the root's box, then paint every node in z-order with its opacity and
//! translation applied.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{Color, RecordingSurface, RenderConfig, Size, SurfaceId};
//! use lumen_layout::{Element, Style};
//! use lumen_paint::Scene;
//!
//! let surface = RecordingSurface::new(Size::new(320.0, 240.0));
//! let mut scene = Scene::new(SurfaceId(0), surface, RenderConfig::default());
//!
//! scene
//!     .mount_root(
//!         "root",
//!         &Element::rect().child(Element::rect().style(Style::new().size(40.0, 40.0).bg(Color::RED))),
//!     )
//!     .unwrap();
//!
//! let stats = scene.frame().unwrap();
//! assert_eq!(stats.paint.draw_calls, 1);
//! ```

pub mod error;
pub mod image;
pub mod pipeline;
pub mod scene;
pub mod text;

pub use error::{PaintError, Result};
pub use image::{compute_crop, ImageCrop};
pub use pipeline::{paint_order, PaintStats, Painter};
pub use scene::{FrameStats, Scene};
pub use text::draw_text;
