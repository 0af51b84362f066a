//! Scene tree error types

use thiserror::Error;

use crate::tree::NodeId;

/// Structural misuse of the scene tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not name a live node (never mounted, or unmounted)
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// A parentless mount while the tree already has a root
    #[error("Tree already has a root node {0:?}")]
    RootExists(NodeId),

    /// A parentless mount without a drawing surface
    #[error("Root node {key:?} was mounted without a drawing surface")]
    MissingSurface { key: String },

    /// A drawing surface was passed for a node that is not the root
    #[error("Only the root node may hold a drawing surface (mounting {key:?})")]
    SurfaceOnChild { key: String },

    /// The node still has a parent (or is the root); detach it first
    #[error("Node {0:?} is already attached to a parent")]
    AlreadyParented(NodeId),

    /// Text and image nodes cannot hold child nodes
    #[error("Node {0:?} cannot contain child nodes")]
    NotContainer(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// The layout engine rejected the tree
    #[error("Layout failed: {0}")]
    Layout(String),
}

impl From<taffy::TaffyError> for SceneError {
    fn from(err: taffy::TaffyError) -> Self {
        SceneError::Layout(err.to_string())
    }
}

/// Result type for scene tree operations
pub type Result<T> = std::result::Result<T, SceneError>;
