//! Recursive node painting
//!
//! Every frame paints the whole attached tree, not only dirty nodes. Per
//! node:
//!
//! 1. A hidden node (opacity at or below zero) is skipped with its subtree
//! 2. Partial opacity or a translation opens a context for node + subtree
//! 3. The node's own background and content are drawn in a second context
//! 4. Children follow in ascending z-index order, ties in declaration order
//!
//! Contexts are closure-scoped, so saves and restores always pair up.

use smallvec::SmallVec;

use lumen_core::{DrawSurface, DrawSurfaceExt};
use lumen_image::ImageCache;
use lumen_layout::{Node, NodeId, NodeKind, NodeTree};

use crate::error::Result;
use crate::image::draw_image;
use crate::text::draw_text;

/// Counters for one paint pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Nodes that were visited and painted
    pub nodes_painted: usize,
    /// Nodes skipped because they, or an ancestor, were hidden
    pub nodes_hidden: usize,
    /// Fill and image calls issued on the surface
    pub draw_calls: usize,
}

/// Children of `node` in paint order
///
/// Stable ascending sort on z-index, so equal indices keep declaration
/// order.
pub fn paint_order(tree: &NodeTree, node: &Node) -> SmallVec<[NodeId; 8]> {
    let mut children: SmallVec<[NodeId; 8]> = node.children().iter().copied().collect();
    children.sort_by_key(|id| tree.get(*id).map_or(0, |child| child.style().z_index));
    children
}

/// Paints a tree onto a surface
pub struct Painter<'a> {
    tree: &'a mut NodeTree,
    images: &'a mut ImageCache,
    stats: PaintStats,
}

impl<'a> Painter<'a> {
    pub fn new(tree: &'a mut NodeTree, images: &'a mut ImageCache) -> Self {
        Self {
            tree,
            images,
            stats: PaintStats::default(),
        }
    }

    /// Paint `root` and its subtree, marking every visited node clean
    pub fn paint(mut self, surface: &mut dyn DrawSurface, root: NodeId) -> Result<PaintStats> {
        self.paint_node(surface, root)?;
        Ok(self.stats)
    }

    fn paint_node(&mut self, surface: &mut dyn DrawSurface, id: NodeId) -> Result<()> {
        let Some(node) = self.tree.get(id) else {
            return Ok(());
        };
        let style = node.style();

        if style.is_hidden() {
            // Nothing is drawn, but the subtree still counts as painted
            for hidden in self.tree.descendants(id) {
                self.tree.clear_dirty(hidden)?;
                self.stats.nodes_hidden += 1;
            }
            return Ok(());
        }

        if !style.needs_layer() {
            return self.paint_contents(surface, id);
        }

        let opacity = style.opacity.filter(|o| *o < 1.0);
        let (dx, dy) = (style.translate_x, style.translate_y);
        surface.scoped(|s| {
            if let Some(opacity) = opacity {
                s.multiply_alpha(opacity);
            }
            if dx != 0.0 || dy != 0.0 {
                s.translate(dx, dy);
            }
            self.paint_contents(s, id)
        })
    }

    fn paint_contents(&mut self, surface: &mut dyn DrawSurface, id: NodeId) -> Result<()> {
        surface.scoped(|s| self.paint_self(s, id));
        self.tree.clear_dirty(id)?;
        self.stats.nodes_painted += 1;

        let order = match self.tree.get(id) {
            Some(node) => paint_order(self.tree, node),
            None => SmallVec::new(),
        };
        for child in order {
            self.paint_node(surface, child)?;
        }
        Ok(())
    }

    /// Background fill, then type-specific content
    fn paint_self(&mut self, surface: &mut dyn DrawSurface, id: NodeId) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        // Not laid out (e.g. attached after the layout pass)
        let Some(bounds) = node.layout().copied() else {
            return;
        };
        let style = node.style();

        if let Some(color) = style.background_color {
            surface.fill_rect(bounds.rect(), color);
            self.stats.draw_calls += 1;
        }

        match node.kind() {
            NodeKind::Text => {
                if let Some(metrics) = node.text_metrics() {
                    let params = style.text_params();
                    self.stats.draw_calls += draw_text(surface, metrics, &params, &bounds);
                }
            }
            NodeKind::Image => {
                if let Some(src) = &style.src {
                    if draw_image(
                        surface,
                        self.images,
                        src,
                        &bounds,
                        style.focus_point,
                        style.original_height,
                    ) {
                        self.stats.draw_calls += 1;
                    }
                }
            }
            NodeKind::Box => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::{Color, SurfaceId};
    use lumen_image::DeferredLoader;
    use lumen_layout::{Element, MountContext, NodeLifecycle, Style};

    use super::*;

    #[test]
    fn test_paint_order_is_stable_by_z_index() {
        let mut tree = NodeTree::new();
        let element = Element::rect()
            .child(Element::rect().style(Style::new().z_index(2)))
            .child(Element::rect().style(Style::new().z_index(0)))
            .child(Element::rect().style(Style::new().z_index(2)))
            .child(Element::rect().style(Style::new().z_index(-1)));
        let root = tree
            .mount("root", &element, MountContext::root(SurfaceId(0)))
            .unwrap();
        let children = tree.children(root).to_vec();

        let order = paint_order(&tree, tree.get(root).unwrap());
        assert_eq!(
            order.as_slice(),
            &[children[3], children[1], children[0], children[2]]
        );
    }

    #[test]
    fn test_unlaid_out_nodes_draw_nothing() {
        let mut tree = NodeTree::new();
        let root = tree
            .mount(
                "root",
                &Element::rect().style(Style::new().bg(Color::RED)),
                MountContext::root(SurfaceId(0)),
            )
            .unwrap();
        let mut images = ImageCache::new(4, DeferredLoader::new());
        let mut surface = lumen_core::RecordingSurface::new(lumen_core::Size::new(10.0, 10.0));

        let stats = Painter::new(&mut tree, &mut images)
            .paint(&mut surface, root)
            .unwrap();
        assert_eq!(stats.nodes_painted, 1);
        assert_eq!(stats.draw_calls, 0);
        assert!(!tree.get(root).unwrap().is_dirty());
        assert_eq!(surface.depth(), 0);
    }
}
