//! Scene: the per-frame entry point
//!
//! A [`Scene`] owns everything a frame needs: the node tree, the image
//! cache, the text layout adapter, the layout pass and the drawing surface.
//! The frame scheduler calls [`Scene::frame`] once per animation frame;
//! tree mutations made in between are coalesced into that single repaint.

use lumen_core::{DrawSurface, RenderConfig, SurfaceId};
use lumen_image::{DecodingLoader, ImageCache, ImageLoader};
use lumen_layout::{Element, LayoutAdapter, MountContext, Node, NodeId, NodeLifecycle, NodeTree};
use lumen_text::{AlwaysReady, EstimatedTextMeasurer, TextLayoutAdapter};

use crate::error::{PaintError, Result};
use crate::pipeline::{PaintStats, Painter};

/// What a frame did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Image loads that finished since the previous frame
    pub images_settled: usize,
    /// Whether a repaint ran (false when the scene has no root)
    pub repainted: bool,
    pub paint: PaintStats,
}

/// A retained scene bound to one drawing surface
pub struct Scene<S: DrawSurface> {
    tree: NodeTree,
    images: ImageCache,
    text: TextLayoutAdapter,
    layout: LayoutAdapter,
    surface: S,
    surface_id: SurfaceId,
    config: RenderConfig,
    frame_count: u64,
}

impl<S: DrawSurface> Scene<S> {
    /// Create a scene painting onto `surface`
    ///
    /// Text is measured with [`EstimatedTextMeasurer`] and every font is
    /// treated as ready; images are decoded by [`DecodingLoader`]. Replace
    /// either with [`Scene::with_text_layout`] / [`Scene::with_image_loader`].
    pub fn new(surface_id: SurfaceId, surface: S, config: RenderConfig) -> Self {
        let viewport = surface.viewport_size();
        Self {
            tree: NodeTree::with_text_defaults(config.text.clone()),
            images: ImageCache::from_config(&config, DecodingLoader),
            text: TextLayoutAdapter::new(EstimatedTextMeasurer, AlwaysReady),
            layout: LayoutAdapter::new(viewport),
            surface,
            surface_id,
            config,
            frame_count: 0,
        }
    }

    pub fn with_text_layout(mut self, text: TextLayoutAdapter) -> Self {
        self.text = text;
        self
    }

    /// Replace the image loader (drops any cached images)
    pub fn with_image_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.images = ImageCache::from_config(&self.config, loader);
        self
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    pub fn text_layout(&self) -> &TextLayoutAdapter {
        &self.text
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Mount the root element onto this scene's surface
    pub fn mount_root(&mut self, key: &str, element: &Element) -> Result<NodeId> {
        let id = self
            .tree
            .mount(key, element, MountContext::root(self.surface_id))?;
        Ok(id)
    }

    /// Run one frame: apply finished image loads, then repaint the root
    pub fn frame(&mut self) -> Result<FrameStats> {
        let images_settled = self.images.poll_loads();
        if images_settled > 0 {
            tracing::debug!("{} image loads settled", images_settled);
        }

        let mut stats = FrameStats {
            images_settled,
            ..FrameStats::default()
        };
        match self.tree.root() {
            Some(root) => {
                stats.paint = self.repaint(root)?;
                stats.repainted = true;
            }
            None => tracing::warn!("Frame requested on a scene without a root"),
        }

        self.frame_count += 1;
        Ok(stats)
    }

    /// Lay out and paint the whole tree under `root`
    ///
    /// Clears the surface to the root's box first; every node is clean
    /// afterwards.
    pub fn repaint(&mut self, root: NodeId) -> Result<PaintStats> {
        let node = self.tree.get(root).ok_or(lumen_layout::SceneError::UnknownNode(root))?;
        let Some(found) = node.surface() else {
            tracing::warn!("Repaint requested from {:?}, which holds no surface", root);
            return Err(PaintError::NotRoot(root));
        };
        if found != self.surface_id {
            tracing::warn!(
                "Root surface {:?} does not match scene surface {:?}",
                found,
                self.surface_id
            );
            return Err(PaintError::ForeignSurface {
                expected: self.surface_id,
                found,
            });
        }

        self.layout.set_viewport(self.surface.viewport_size());
        self.layout.compute(&mut self.tree, root, &self.text)?;

        if let Some(bounds) = self.tree.get(root).and_then(Node::layout) {
            self.surface.clear_rect(bounds.rect());
        }

        let stats = Painter::new(&mut self.tree, &mut self.images).paint(&mut self.surface, root)?;
        tracing::trace!(
            "Painted {} nodes ({} hidden, {} draw calls)",
            stats.nodes_painted,
            stats.nodes_hidden,
            stats.draw_calls
        );
        Ok(stats)
    }
}

impl<S: DrawSurface> NodeLifecycle for Scene<S> {
    fn mount(&mut self, key: &str, element: &Element, context: MountContext) -> lumen_layout::Result<NodeId> {
        self.tree.mount(key, element, context)
    }

    fn update(&mut self, id: NodeId, element: &Element) -> lumen_layout::Result<()> {
        self.tree.update(id, element)
    }

    fn unmount(&mut self, id: NodeId) -> lumen_layout::Result<Node> {
        self.tree.unmount(id)
    }

    fn mark_dirty(&mut self, id: NodeId) -> lumen_layout::Result<()> {
        self.tree.mark_dirty(id)
    }
}

impl<S: DrawSurface> std::fmt::Debug for Scene<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("surface_id", &self.surface_id)
            .field("nodes", &self.tree.len())
            .field("images", &self.images.len())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}
