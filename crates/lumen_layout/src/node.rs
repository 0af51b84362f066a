//! Scene nodes and the elements they are mounted from

use lumen_core::{Rect, SurfaceId};
use lumen_text::TextMetrics;
use smallvec::SmallVec;

use crate::style::Style;
use crate::tree::NodeId;

/// What a node draws, fixed when it is mounted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A rectangle that may hold child nodes
    Box,
    /// A run of text built from leaf content
    Text,
    /// An image resolved through the image cache
    Image,
}

impl NodeKind {
    /// Derive the kind from a declared tag (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("text") {
            NodeKind::Text
        } else if tag.eq_ignore_ascii_case("image") || tag.eq_ignore_ascii_case("img") {
            NodeKind::Image
        } else {
            NodeKind::Box
        }
    }

    /// Whether nodes of this kind hold child nodes
    pub fn is_container(self) -> bool {
        self == NodeKind::Box
    }
}

/// A single child entry of an [`Element`]
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Str(String),
    Number(f64),
    Element(Element),
}

impl Content {
    /// Strings and numbers are leaf content; only text nodes accept them
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Content::Element(_))
    }

    /// Append the text form of leaf content to `out`
    fn write_text(&self, out: &mut String) {
        match self {
            Content::Str(s) => out.push_str(s),
            Content::Number(n) => out.push_str(&format_number(*n)),
            Content::Element(_) => {}
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Str(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Str(s)
    }
}

impl From<f64> for Content {
    fn from(n: f64) -> Self {
        Content::Number(n)
    }
}

impl From<i32> for Content {
    fn from(n: i32) -> Self {
        Content::Number(n as f64)
    }
}

impl From<Element> for Content {
    fn from(element: Element) -> Self {
        Content::Element(element)
    }
}

/// Format a number the way script runtimes join them into strings
///
/// Integral values print without a fractional part (`3`, not `3.0`).
pub(crate) fn format_number(n: f64) -> String {
    if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Declarative description of a node: what the diffing framework hands to
/// `mount` and `update`
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub tag: String,
    pub style: Style,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            style: Style::default(),
            children: Vec::new(),
        }
    }

    /// A `rect` box element
    pub fn rect() -> Self {
        Self::new("rect")
    }

    /// A `text` element holding `content`
    pub fn text(content: impl Into<Content>) -> Self {
        Self::new("text").child(content)
    }

    /// An `image` element showing `src`
    pub fn image(src: impl Into<String>) -> Self {
        let mut element = Self::new("image");
        element.style = element.style.src(src);
        element
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Edit the current style in place
    pub fn with_style(mut self, f: impl FnOnce(Style) -> Style) -> Self {
        self.style = f(self.style);
        self
    }

    pub fn child(mut self, child: impl Into<Content>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = impl Into<Content>>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_tag(&self.tag)
    }

    /// Concatenation of all leaf children
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            child.write_text(&mut text);
        }
        text
    }

    /// Element children, in order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            _ => None,
        })
    }
}

/// Where `mount` attaches a new node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountContext {
    /// `None` mounts the node as the tree root
    pub parent: Option<NodeId>,
    /// Drawing surface; required for the root, rejected otherwise
    pub surface: Option<SurfaceId>,
}

impl MountContext {
    /// Context for mounting the root onto `surface`
    pub fn root(surface: SurfaceId) -> Self {
        Self {
            parent: None,
            surface: Some(surface),
        }
    }

    /// Context for mounting under `parent`
    pub fn child_of(parent: NodeId) -> Self {
        Self {
            parent: Some(parent),
            surface: None,
        }
    }
}

/// Resolved box of a node in absolute surface coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub right: f32,
    pub bottom: f32,
}

impl LayoutBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// A retained node of the scene tree
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) tag: String,
    pub(crate) key: String,
    pub(crate) style: Style,
    pub(crate) text: String,
    pub(crate) text_metrics: Option<TextMetrics>,
    pub(crate) layout: Option<LayoutBox>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) dirty: bool,
    pub(crate) surface: Option<SurfaceId>,
}

impl Node {
    pub(crate) fn new(key: &str, tag: &str) -> Self {
        let tag = tag.to_lowercase();
        Self {
            kind: NodeKind::from_tag(&tag),
            tag,
            key: key.to_string(),
            style: Style::default(),
            text: String::new(),
            text_metrics: None,
            layout: None,
            children: SmallVec::new(),
            parent: None,
            dirty: false,
            surface: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The lower-cased declared tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolved style
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Text content (empty for non-text nodes)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_metrics(&self) -> Option<&TextMetrics> {
        self.text_metrics.as_ref()
    }

    /// `None` until the layout pass has run
    pub fn layout(&self) -> Option<&LayoutBox> {
        self.layout.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Drop everything the node references
    pub(crate) fn clear(&mut self) {
        self.style = Style::default();
        self.text.clear();
        self.text_metrics = None;
        self.layout = None;
        self.children.clear();
        self.parent = None;
        self.surface = None;
    }
}

/// Panic in debug builds when content does not suit the node kind
///
/// Text nodes accept only strings and numbers; every other kind accepts
/// only elements.
pub(crate) fn check_content_types(tag: &str, kind: NodeKind, children: &[Content]) {
    for child in children {
        if kind == NodeKind::Text {
            debug_assert!(
                child.is_leaf(),
                "text component only accepts text or numeric content"
            );
        } else {
            debug_assert!(
                !child.is_leaf(),
                "text or numeric content is only accepted by <text> components and not {tag}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(NodeKind::from_tag("text"), NodeKind::Text);
        assert_eq!(NodeKind::from_tag("Text"), NodeKind::Text);
        assert_eq!(NodeKind::from_tag("IMG"), NodeKind::Image);
        assert_eq!(NodeKind::from_tag("image"), NodeKind::Image);
        assert_eq!(NodeKind::from_tag("rect"), NodeKind::Box);
        assert_eq!(NodeKind::from_tag("view"), NodeKind::Box);
    }

    #[test]
    fn test_text_content_joins_leaves() {
        let element = Element::new("text").child("x = ").child(3).child(", y = ").child(2.5);
        assert_eq!(element.text_content(), "x = 3, y = 2.5");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(-1e3), "-1000");
    }

    #[test]
    fn test_layout_box_edges() {
        let b = LayoutBox::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!((b.right, b.bottom), (40.0, 60.0));
        assert_eq!(b.rect(), Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_image_element_sets_src() {
        let element = Element::image("cat.png");
        assert_eq!(element.kind(), NodeKind::Image);
        assert_eq!(element.style.src.as_deref(), Some("cat.png"));
    }
}
