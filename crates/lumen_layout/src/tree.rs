//! The retained scene tree
//!
//! Nodes live in a slot map and refer to each other by [`NodeId`]: a node
//! owns the ordered list of its child ids and keeps a non-owning handle to
//! its parent. Unmounting removes a node (and its subtree) from the map, so
//! stale ids are detected instead of dangling.
//!
//! The external diffing framework drives the tree through the
//! [`NodeLifecycle`] trait.

use slotmap::{new_key_type, SlotMap};

use lumen_core::TextDefaults;

use crate::error::{Result, SceneError};
use crate::node::{check_content_types, Element, MountContext, Node, NodeKind};
use crate::reconcile::{ChildReconciler, PositionalReconciler};
use crate::style::StyleResolver;

new_key_type! {
    /// Handle to a node in a [`NodeTree`]
    pub struct NodeId;
}

/// Lifecycle entry points called by the diffing framework
pub trait NodeLifecycle {
    /// Create a node (and its subtree) from `element`
    ///
    /// With no parent in `context` the node becomes the tree root and takes
    /// the context's drawing surface.
    fn mount(&mut self, key: &str, element: &Element, context: MountContext) -> Result<NodeId>;

    /// Apply a new style and child list to an existing node
    fn update(&mut self, id: NodeId, element: &Element) -> Result<()>;

    /// Destroy a node and its subtree, returning the cleared node
    fn unmount(&mut self, id: NodeId) -> Result<Node>;

    /// Flag a node as changed, propagating to its ancestors
    fn mark_dirty(&mut self, id: NodeId) -> Result<()>;
}

/// Arena of scene nodes with a single root
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
    resolver: StyleResolver,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree whose text nodes fall back to `defaults`
    pub fn with_text_defaults(defaults: TextDefaults) -> Self {
        Self {
            resolver: StyleResolver::new(defaults),
            ..Self::default()
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Child ids of `id` in declaration order (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn resolver(&self) -> &StyleResolver {
        &self.resolver
    }

    /// Ids of `id` and every descendant, parents before children
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Reset a node's dirty flag; ancestors are left alone
    pub fn clear_dirty(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.dirty = false;
        Ok(())
    }

    /// Whether any live node is still dirty
    pub fn any_dirty(&self) -> bool {
        self.nodes.values().any(|n| n.dirty)
    }

    /// Apply `element` to `id`, reconciling children with `reconciler`
    pub fn update_with(
        &mut self,
        id: NodeId,
        element: &Element,
        reconciler: &mut dyn ChildReconciler,
    ) -> Result<()> {
        let node = self.node(id)?;
        let kind = node.kind;
        check_content_types(&node.tag, kind, &element.children);

        let style = self.resolver.resolve(kind, &element.style);
        let node = self.node_mut(id)?;
        if kind == NodeKind::Text {
            let text = element.text_content();
            if text != node.text || node.style.text_layout_changed(&style) {
                node.text_metrics = None;
            }
            node.text = text;
        }
        node.style = style;
        node.layout = None;
        self.mark_dirty(id)?;

        if kind.is_container() {
            let next: Vec<&Element> = element.child_elements().collect();
            reconciler.reconcile(self, id, &next)?;
        }
        Ok(())
    }

    /// Mount `element` as a new child of `parent` at `index` (clamped)
    pub fn insert_child(&mut self, parent: NodeId, index: usize, element: &Element) -> Result<NodeId> {
        let parent_node = self.node(parent)?;
        if !parent_node.kind.is_container() {
            return Err(SceneError::NotContainer(parent));
        }
        let key = format!("{}.{}", parent_node.key, index);
        let child = self.build(&key, element, Some(parent))?;

        let children = &mut self.node_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.mark_dirty(child)?;
        Ok(child)
    }

    /// Unmount `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<Node> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::UnknownNode(child));
        }
        self.unmount(child)
    }

    /// Take a node out of its parent's child list without destroying it
    ///
    /// Detached nodes keep their subtree but are not laid out or painted
    /// until they are attached again.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.unlink(parent, id);
        self.node_mut(id)?.parent = None;
        self.mark_dirty(parent)
    }

    /// Attach a detached node under `parent` at `index` (clamped)
    pub fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if !self.node(parent)?.kind.is_container() {
            return Err(SceneError::NotContainer(parent));
        }
        if self.node(child)?.parent.is_some() || self.root == Some(child) {
            return Err(SceneError::AlreadyParented(child));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(SceneError::Cycle { parent, child });
            }
            ancestor = self.parent(current);
        }

        let children = &mut self.node_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark_dirty(child)
    }

    /// Create `element` and its subtree without linking it into a parent's
    /// child list
    fn build(&mut self, key: &str, element: &Element, parent: Option<NodeId>) -> Result<NodeId> {
        let mut node = Node::new(key, &element.tag);
        check_content_types(&node.tag, node.kind, &element.children);

        node.style = self.resolver.resolve(node.kind, &element.style);
        node.parent = parent;
        node.dirty = true;
        if node.kind == NodeKind::Text {
            node.text = element.text_content();
        }
        let is_container = node.kind.is_container();
        let id = self.nodes.insert(node);

        if is_container {
            for (index, child) in element.child_elements().enumerate() {
                let child_key = format!("{key}.{index}");
                let child_id = self.build(&child_key, child, Some(id))?;
                self.node_mut(id)?.children.push(child_id);
            }
        }
        Ok(id)
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|c| *c != child);
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(mut node) = self.nodes.remove(id) else {
            return;
        };
        for child in std::mem::take(&mut node.children) {
            self.remove_subtree(child);
        }
    }
}

impl NodeLifecycle for NodeTree {
    fn mount(&mut self, key: &str, element: &Element, context: MountContext) -> Result<NodeId> {
        match context.parent {
            None => {
                if let Some(root) = self.root {
                    return Err(SceneError::RootExists(root));
                }
                let Some(surface) = context.surface else {
                    return Err(SceneError::MissingSurface {
                        key: key.to_string(),
                    });
                };
                let id = self.build(key, element, None)?;
                self.node_mut(id)?.surface = Some(surface);
                self.root = Some(id);
                tracing::debug!("Mounted root {} on surface {:?}", key, surface);
                Ok(id)
            }
            Some(parent) => {
                if context.surface.is_some() {
                    return Err(SceneError::SurfaceOnChild {
                        key: key.to_string(),
                    });
                }
                let parent_node = self.node(parent)?;
                if !parent_node.kind.is_container() {
                    return Err(SceneError::NotContainer(parent));
                }
                let id = self.build(key, element, Some(parent))?;
                self.node_mut(parent)?.children.push(id);
                self.mark_dirty(id)?;
                Ok(id)
            }
        }
    }

    fn update(&mut self, id: NodeId, element: &Element) -> Result<()> {
        self.update_with(id, element, &mut PositionalReconciler)
    }

    fn unmount(&mut self, id: NodeId) -> Result<Node> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.unlink(parent, id);
            self.mark_dirty(parent)?;
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut node = self.nodes.remove(id).ok_or(SceneError::UnknownNode(id))?;
        for child in std::mem::take(&mut node.children) {
            self.remove_subtree(child);
        }
        node.clear();
        tracing::trace!("Unmounted {} ({} nodes left)", node.key, self.nodes.len());
        Ok(node)
    }

    fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.dirty = true;

        let mut current = node.parent;
        while let Some(ancestor) = current.and_then(|a| self.nodes.get_mut(a)) {
            if ancestor.dirty {
                break;
            }
            ancestor.dirty = true;
            current = ancestor.parent;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::{Color, SurfaceId};

    use super::*;
    use crate::style::Style;

    const SURFACE: SurfaceId = SurfaceId(1);

    fn demo() -> Element {
        Element::rect().style(Style::new().size(1280.0, 1024.0)).child(
            Element::rect()
                .style(Style::new().bg(Color::ORANGE))
                .child(Element::rect().style(Style::new().size(50.0, 50.0)))
                .child(Element::text("haha")),
        )
    }

    fn mount_demo(tree: &mut NodeTree) -> NodeId {
        tree.mount("root", &demo(), MountContext::root(SURFACE))
            .unwrap()
    }

    fn clear_all(tree: &mut NodeTree) {
        let root = tree.root().unwrap();
        for id in tree.descendants(root) {
            tree.clear_dirty(id).unwrap();
        }
    }

    #[test]
    fn test_mount_builds_subtree() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root(), Some(root));
        let root_node = tree.get(root).unwrap();
        assert_eq!(root_node.surface(), Some(SURFACE));
        assert_eq!(root_node.parent(), None);

        let panel = tree.children(root)[0];
        assert_eq!(tree.get(panel).unwrap().key(), "root.0");
        assert_eq!(tree.get(panel).unwrap().surface(), None);

        let text = tree.children(panel)[1];
        let text_node = tree.get(text).unwrap();
        assert_eq!(text_node.kind(), NodeKind::Text);
        assert_eq!(text_node.text(), "haha");
        assert_eq!(text_node.style().font_size, Some(16.0));
        assert_eq!(text_node.parent(), Some(panel));
        assert!(text_node.is_dirty());
    }

    #[test]
    fn test_second_root_rejected() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let err = tree
            .mount("again", &Element::rect(), MountContext::root(SurfaceId(2)))
            .unwrap_err();
        assert_eq!(err, SceneError::RootExists(root));
    }

    #[test]
    fn test_root_requires_surface() {
        let mut tree = NodeTree::new();
        let err = tree
            .mount("root", &Element::rect(), MountContext::default())
            .unwrap_err();
        assert!(matches!(err, SceneError::MissingSurface { .. }));
    }

    #[test]
    fn test_child_cannot_take_surface() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let context = MountContext {
            parent: Some(root),
            surface: Some(SURFACE),
        };
        let err = tree.mount("x", &Element::rect(), context).unwrap_err();
        assert!(matches!(err, SceneError::SurfaceOnChild { .. }));
    }

    #[test]
    fn test_mount_under_parent_appends_and_dirties() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        clear_all(&mut tree);

        let panel = tree.children(root)[0];
        let id = tree
            .mount("extra", &Element::rect(), MountContext::child_of(panel))
            .unwrap();
        assert_eq!(tree.children(panel).last(), Some(&id));
        assert!(tree.get(root).unwrap().is_dirty());
    }

    #[test]
    fn test_mount_under_text_rejected() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let panel = tree.children(root)[0];
        let text = tree.children(panel)[1];
        let err = tree
            .mount("x", &Element::rect(), MountContext::child_of(text))
            .unwrap_err();
        assert_eq!(err, SceneError::NotContainer(text));
    }

    #[test]
    fn test_mark_dirty_reaches_root_at_any_depth() {
        let mut tree = NodeTree::new();
        let mut element = Element::text("leaf");
        for _ in 0..10 {
            element = Element::rect().child(element);
        }
        let root = tree
            .mount("root", &element, MountContext::root(SURFACE))
            .unwrap();
        clear_all(&mut tree);

        let leaf = *tree.descendants(root).last().unwrap();
        assert_eq!(tree.get(leaf).unwrap().kind(), NodeKind::Text);
        tree.mark_dirty(leaf).unwrap();

        for id in tree.descendants(root) {
            assert!(tree.get(id).unwrap().is_dirty());
        }
    }

    #[test]
    fn test_mark_dirty_stops_at_dirty_ancestor() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        clear_all(&mut tree);

        let panel = tree.children(root)[0];
        let text = tree.children(panel)[1];
        tree.node_mut(panel).unwrap().dirty = true;
        tree.mark_dirty(text).unwrap();

        // Propagation ends at the already dirty panel
        assert!(!tree.get(root).unwrap().is_dirty());
    }

    #[test]
    fn test_clear_dirty_is_local() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let panel = tree.children(root)[0];
        tree.clear_dirty(panel).unwrap();
        assert!(!tree.get(panel).unwrap().is_dirty());
        assert!(tree.get(root).unwrap().is_dirty());
    }

    #[test]
    fn test_update_marks_ancestors_and_resets_layout() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        clear_all(&mut tree);

        let panel = tree.children(root)[0];
        let text = tree.children(panel)[1];
        tree.node_mut(text).unwrap().layout = Some(Default::default());
        tree.update(text, &Element::text("haha").style(Style::new().color(Color::RED)))
            .unwrap();

        let node = tree.get(text).unwrap();
        assert!(node.layout().is_none());
        assert_eq!(node.style().color, Some(Color::RED));
        assert!(tree.get(panel).unwrap().is_dirty());
        assert!(tree.get(root).unwrap().is_dirty());
    }

    #[test]
    fn test_update_invalidates_text_metrics() {
        let mut tree = NodeTree::new();
        let root = tree
            .mount("root", &Element::rect().child(Element::text("a")), MountContext::root(SURFACE))
            .unwrap();
        let text = tree.children(root)[0];
        tree.node_mut(text).unwrap().text_metrics = Some(Default::default());

        // Color does not affect line breaking
        tree.update(text, &Element::text("a").style(Style::new().color(Color::RED)))
            .unwrap();
        assert!(tree.get(text).unwrap().text_metrics().is_some());

        tree.update(text, &Element::text("b")).unwrap();
        assert!(tree.get(text).unwrap().text_metrics().is_none());
        assert_eq!(tree.get(text).unwrap().text(), "b");

        tree.node_mut(text).unwrap().text_metrics = Some(Default::default());
        tree.update(text, &Element::text("b").style(Style::new().font_size(30.0)))
            .unwrap();
        assert!(tree.get(text).unwrap().text_metrics().is_none());
    }

    #[test]
    fn test_unmount_returns_cleared_node() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let node = tree.unmount(root).unwrap();

        assert_eq!(node.style(), &Style::default());
        assert_eq!(node.text(), "");
        assert!(node.children().is_empty());
        assert!(node.layout().is_none());
        assert!(node.text_metrics().is_none());
        assert_eq!(node.parent(), None);
        assert_eq!(node.surface(), None);

        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.unmount(root).unwrap_err(), SceneError::UnknownNode(root));
    }

    #[test]
    fn test_mount_then_unmount_child_leaves_no_trace() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let before = tree.len();

        let id = tree
            .mount("t", &Element::text("hello"), MountContext::child_of(root))
            .unwrap();
        let node = tree.unmount(id).unwrap();

        assert_eq!(node.text(), "");
        assert_eq!(node.style(), &Style::default());
        assert_eq!(tree.len(), before);
        assert!(!tree.children(root).contains(&id));
        assert!(tree.get(id).is_none());
    }

    #[test]
    fn test_detach_and_attach() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let panel = tree.children(root)[0];
        let square = tree.children(panel)[0];

        assert_eq!(tree.attach(root, 0, square).unwrap_err(), SceneError::AlreadyParented(square));

        tree.detach(square).unwrap();
        assert_eq!(tree.parent(square), None);
        assert_eq!(tree.children(panel).len(), 1);

        tree.attach(root, 0, square).unwrap();
        assert_eq!(tree.children(root), &[square, panel]);
        assert_eq!(tree.parent(square), Some(root));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut tree = NodeTree::new();
        let root = mount_demo(&mut tree);
        let panel = tree.children(root)[0];
        let square = tree.children(panel)[0];

        tree.detach(panel).unwrap();
        let err = tree.attach(square, 0, panel).unwrap_err();
        assert_eq!(err, SceneError::Cycle { parent: square, child: panel });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "text component only accepts text or numeric content")]
    fn test_text_rejects_element_children() {
        let mut tree = NodeTree::new();
        let element = Element::new("text").child(Element::rect());
        let _ = tree.mount("root", &element, MountContext::root(SURFACE));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "only accepted by <text> components and not rect")]
    fn test_box_rejects_leaf_children() {
        let mut tree = NodeTree::new();
        let element = Element::rect().child("loose text");
        let _ = tree.mount("root", &element, MountContext::root(SURFACE));
    }
}
