//! Flexbox layout through Taffy
//!
//! Each frame the attached part of the scene tree is mirrored into a Taffy
//! tree, laid out, and the results written back to the nodes as absolute
//! [`LayoutBox`]es. Text nodes are leaves with a measure context: Taffy
//! calls back with the available width and gets the size of the broken
//! lines, or zero while the node's font is not ready.

use taffy::geometry::Size as TaffySize;
use taffy::prelude::{AvailableSpace, Dimension, NodeId as TaffyNodeId, TaffyTree};

use lumen_core::{FontFace, Size};
use lumen_text::{TextLayoutAdapter, TextLayoutRequest, TextMetrics};

use crate::error::Result;
use crate::node::{LayoutBox, NodeKind};
use crate::tree::{NodeId, NodeTree};

/// Context stored with text nodes for measurement during layout
#[derive(Clone, Debug)]
pub struct TextMeasureContext {
    pub text: String,
    pub font: FontFace,
    pub font_size: f32,
    pub line_height: f32,
    /// Last metrics computed for this node, reused while the width matches
    pub metrics: Option<TextMetrics>,
}

impl TextMeasureContext {
    /// Metrics for breaking at `max_width`, reusing cached ones if possible
    fn metrics_for(&mut self, max_width: Option<f32>, text: &TextLayoutAdapter) -> Option<&TextMetrics> {
        let reusable = self
            .metrics
            .as_ref()
            .is_some_and(|m| m.matches_width(max_width));
        if !reusable {
            self.metrics = text.layout(&TextLayoutRequest {
                text: &self.text,
                max_width,
                font: &self.font,
                font_size: self.font_size,
                line_height: self.line_height,
            });
        }
        self.metrics.as_ref()
    }
}

/// Measure function for text nodes
fn measure_text(
    known_dimensions: TaffySize<Option<f32>>,
    available_space: TaffySize<AvailableSpace>,
    context: Option<&mut TextMeasureContext>,
    text: &TextLayoutAdapter,
) -> TaffySize<f32> {
    if let TaffySize {
        width: Some(width),
        height: Some(height),
    } = known_dimensions
    {
        return TaffySize { width, height };
    }

    let Some(context) = context else {
        return TaffySize::ZERO;
    };

    let max_width = known_dimensions.width.or(match available_space.width {
        AvailableSpace::Definite(w) => Some(w),
        AvailableSpace::MaxContent => None,
        // Break at every opportunity
        AvailableSpace::MinContent => Some(0.0),
    });

    let (width, height) = context
        .metrics_for(max_width, text)
        .map_or((0.0, 0.0), |m| (m.width, m.height));

    TaffySize {
        width: known_dimensions.width.unwrap_or(width),
        height: known_dimensions.height.unwrap_or(height),
    }
}

/// Runs the layout pass over a [`NodeTree`]
pub struct LayoutAdapter {
    taffy: TaffyTree<TextMeasureContext>,
    viewport: Size,
}

impl LayoutAdapter {
    /// `viewport` sizes the root when it declares no width or height
    pub fn new(viewport: Size) -> Self {
        Self {
            taffy: TaffyTree::new(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Lay out the subtree rooted at `root` and store every node's box
    pub fn compute(&mut self, tree: &mut NodeTree, root: NodeId, text: &TextLayoutAdapter) -> Result<()> {
        self.taffy.clear();

        let mut node_count = 0;
        let taffy_root = self.build(tree, root, true, &mut node_count)?;

        let available = TaffySize {
            width: AvailableSpace::Definite(self.viewport.width),
            height: AvailableSpace::Definite(self.viewport.height),
        };
        self.taffy.compute_layout_with_measure(
            taffy_root,
            available,
            |known, available, _id, context, _style| measure_text(known, available, context, text),
        )?;

        self.write_back(tree, root, taffy_root, 0.0, 0.0, text)?;
        tracing::trace!("Laid out {} nodes", node_count);
        Ok(())
    }

    fn build(
        &mut self,
        tree: &NodeTree,
        id: NodeId,
        is_root: bool,
        node_count: &mut usize,
    ) -> Result<TaffyNodeId> {
        let node = tree.node(id)?;
        let mut style = node.style.layout.clone();
        if is_root {
            if style.size.width == Dimension::Auto {
                style.size.width = Dimension::Length(self.viewport.width);
            }
            if style.size.height == Dimension::Auto {
                style.size.height = Dimension::Length(self.viewport.height);
            }
        }

        let taffy_id = match node.kind {
            NodeKind::Text => {
                let params = node.style.text_params();
                self.taffy.new_leaf_with_context(
                    style,
                    TextMeasureContext {
                        text: node.text.clone(),
                        font: params.font,
                        font_size: params.font_size,
                        line_height: params.line_height,
                        metrics: node.text_metrics.clone(),
                    },
                )?
            }
            NodeKind::Image => self.taffy.new_leaf(style)?,
            NodeKind::Box => {
                let children = node
                    .children
                    .iter()
                    .map(|&child| self.build(tree, child, false, node_count))
                    .collect::<Result<Vec<_>>>()?;
                self.taffy.new_with_children(style, &children)?
            }
        };

        *node_count += 1;
        Ok(taffy_id)
    }

    fn write_back(
        &mut self,
        tree: &mut NodeTree,
        id: NodeId,
        taffy_id: TaffyNodeId,
        parent_left: f32,
        parent_top: f32,
        text: &TextLayoutAdapter,
    ) -> Result<()> {
        let layout = *self.taffy.layout(taffy_id)?;
        let left = parent_left + layout.location.x;
        let top = parent_top + layout.location.y;
        let layout_box = LayoutBox::new(left, top, layout.size.width, layout.size.height);

        let metrics = match self.taffy.get_node_context_mut(taffy_id) {
            Some(context) => {
                let width = layout_box.width;
                let fits = context.metrics.as_ref().is_some_and(|m| m.fits_width(width));
                if fits {
                    context.metrics.take()
                } else {
                    context.metrics_for(Some(width), text).cloned()
                }
            }
            None => None,
        };

        let node = tree.node_mut(id)?;
        node.layout = Some(layout_box);
        if node.kind == NodeKind::Text {
            node.text_metrics = metrics;
        }

        let children = node.children.clone();
        let taffy_children = self.taffy.children(taffy_id)?;
        for (child, taffy_child) in children.into_iter().zip(taffy_children) {
            self.write_back(tree, child, taffy_child, left, top, text)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LayoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutAdapter")
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
