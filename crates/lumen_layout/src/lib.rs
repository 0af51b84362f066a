//! Lumen Scene Tree and Layout
//!
//! The retained half of Lumen:
//!
//! - **Nodes**: box, text and image nodes mounted from declarative [`Element`]s
//! - **Tree**: an arena of nodes driven through the [`NodeLifecycle`] trait
//! - **Reconciliation**: a pluggable [`ChildReconciler`] for child lists
//! - **Styles**: typed [`Style`]s resolved against text defaults
//! - **Layout**: flexbox layout via Taffy, written back as absolute boxes
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{Color, Size, SurfaceId};
//! use lumen_layout::{Element, LayoutAdapter, MountContext, NodeLifecycle, NodeTree, Style};
//! use lumen_text::{AlwaysReady, EstimatedTextMeasurer, TextLayoutAdapter};
//!
//! let mut tree = NodeTree::new();
//! let root = tree
//!     .mount(
//!         "root",
//!         &Element::rect()
//!             .style(Style::new().size(400.0, 300.0))
//!             .child(Element::rect().style(Style::new().size(50.0, 50.0).bg(Color::BLUE))),
//!         MountContext::root(SurfaceId(0)),
//!     )
//!     .unwrap();
//!
//! let text = TextLayoutAdapter::new(EstimatedTextMeasurer, AlwaysReady);
//! let mut layout = LayoutAdapter::new(Size::new(400.0, 300.0));
//! layout.compute(&mut tree, root, &text).unwrap();
//!
//! let child = tree.children(root)[0];
//! assert_eq!(tree.get(child).unwrap().layout().unwrap().width, 50.0);
//! ```

pub mod error;
pub mod layout;
pub mod node;
pub mod reconcile;
pub mod style;
pub mod tree;

pub use error::{Result, SceneError};
pub use layout::{LayoutAdapter, TextMeasureContext};
pub use node::{Content, Element, LayoutBox, MountContext, Node, NodeKind};
pub use reconcile::{ChildReconciler, PositionalReconciler};
pub use style::{Style, StyleResolver, TextParams};
pub use tree::{NodeId, NodeLifecycle, NodeTree};

// Re-export the Taffy style enums used by `Style` builders
pub use taffy::prelude::{AlignItems, AlignSelf, FlexDirection, JustifyContent};
