//! Child reconciliation
//!
//! Deciding which existing children to keep, replace or drop is the job of
//! the diffing framework driving the tree. It plugs in through
//! [`ChildReconciler`] and edits the tree with the per-node operations
//! (`update_with`, `insert_child`, `remove_child`, `detach`, `attach`).

use crate::error::Result;
use crate::node::Element;
use crate::tree::{NodeId, NodeTree};

/// Brings the children of `parent` in line with `next`
pub trait ChildReconciler {
    fn reconcile(&mut self, tree: &mut NodeTree, parent: NodeId, next: &[&Element]) -> Result<()>;
}

/// Pairs children by position
///
/// The i-th existing child is updated in place when it has the same tag as
/// the i-th element and replaced otherwise. Surplus children are unmounted
/// and surplus elements are mounted at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalReconciler;

impl ChildReconciler for PositionalReconciler {
    fn reconcile(&mut self, tree: &mut NodeTree, parent: NodeId, next: &[&Element]) -> Result<()> {
        let existing = tree.children(parent).to_vec();

        for (index, element) in next.iter().enumerate() {
            match existing.get(index) {
                Some(&child) if tree.node(child)?.tag.eq_ignore_ascii_case(&element.tag) => {
                    tree.update_with(child, element, self)?;
                }
                Some(&child) => {
                    tree.remove_child(parent, child)?;
                    tree.insert_child(parent, index, element)?;
                }
                None => {
                    tree.insert_child(parent, index, element)?;
                }
            }
        }

        for &child in existing.iter().skip(next.len()) {
            tree.remove_child(parent, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::{Color, SurfaceId};

    use super::*;
    use crate::node::{MountContext, NodeKind};
    use crate::style::Style;
    use crate::tree::NodeLifecycle;

    fn mount(tree: &mut NodeTree, element: &Element) -> NodeId {
        tree.mount("root", element, MountContext::root(SurfaceId(0)))
            .unwrap()
    }

    fn tags(tree: &NodeTree, id: NodeId) -> Vec<String> {
        tree.children(id)
            .iter()
            .map(|c| tree.get(*c).unwrap().tag().to_string())
            .collect()
    }

    #[test]
    fn test_same_tags_update_in_place() {
        let mut tree = NodeTree::new();
        let root = mount(&mut tree, &Element::rect().child(Element::rect()).child(Element::text("a")));
        let before = tree.children(root).to_vec();

        let next = Element::rect()
            .child(Element::rect().style(Style::new().bg(Color::RED)))
            .child(Element::text("b"));
        tree.update(root, &next).unwrap();

        assert_eq!(tree.children(root), before.as_slice());
        assert_eq!(tree.get(before[0]).unwrap().style().background_color, Some(Color::RED));
        assert_eq!(tree.get(before[1]).unwrap().text(), "b");
    }

    #[test]
    fn test_tag_change_replaces_child() {
        let mut tree = NodeTree::new();
        let root = mount(&mut tree, &Element::rect().child(Element::rect()).child(Element::rect()));
        let old = tree.children(root).to_vec();

        tree.update(root, &Element::rect().child(Element::rect()).child(Element::text("new")))
            .unwrap();

        let now = tree.children(root);
        assert_eq!(now[0], old[0]);
        assert_ne!(now[1], old[1]);
        assert!(!tree.contains(old[1]));
        assert_eq!(tree.get(now[1]).unwrap().kind(), NodeKind::Text);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_grow_and_shrink() {
        let mut tree = NodeTree::new();
        let root = mount(&mut tree, &Element::rect().child(Element::rect()));

        tree.update(
            root,
            &Element::rect()
                .child(Element::rect())
                .child(Element::text("x"))
                .child(Element::image("a.png")),
        )
        .unwrap();
        assert_eq!(tags(&tree, root), vec!["rect", "text", "image"]);

        tree.update(root, &Element::rect()).unwrap();
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_nested_children_reconciled() {
        let mut tree = NodeTree::new();
        let root = mount(
            &mut tree,
            &Element::rect().child(Element::rect().child(Element::text("inner"))),
        );
        let inner_box = tree.children(root)[0];
        let inner_text = tree.children(inner_box)[0];

        tree.update(
            root,
            &Element::rect().child(Element::rect().child(Element::text("changed"))),
        )
        .unwrap();
        assert_eq!(tree.get(inner_text).unwrap().text(), "changed");
    }
}
