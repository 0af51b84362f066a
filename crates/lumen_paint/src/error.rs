//! Paint pipeline errors

use lumen_core::SurfaceId;
use lumen_layout::{NodeId, SceneError};
use thiserror::Error;

/// Errors from a repaint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaintError {
    /// The tree was changed in a way the pipeline could not follow
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Repaint was asked to start from a node that holds no surface
    #[error("Node {0:?} is not a root: it holds no drawing surface")]
    NotRoot(NodeId),

    /// The root paints onto a different surface than the scene owns
    #[error("Root paints onto {found:?} but the scene owns {expected:?}")]
    ForeignSurface {
        expected: SurfaceId,
        found: SurfaceId,
    },
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, PaintError>;
