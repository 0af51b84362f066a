//! Node styles and the style resolver
//!
//! A [`Style`] carries everything a node can declare: the flexbox
//! properties handed to Taffy, the paint properties read by the paint
//! pipeline, and the text and image specific properties. Everything is
//! typed; there is no open property map.
//!
//! ```ignore
//! let style = Style::new()
//!     .w(150.0)
//!     .h(150.0)
//!     .left(20.0)
//!     .bg(Color::ORANGE)
//!     .opacity(0.5);
//! ```

use lumen_core::{Color, FontFace, Point, TextAlign, TextDefaults};
use taffy::prelude::{
    AlignItems, AlignSelf, Dimension, Display, FlexDirection, FlexWrap, JustifyContent,
    LengthPercentage, LengthPercentageAuto, Position,
};

use crate::node::NodeKind;

/// Declared style of a node
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Flexbox properties, passed to Taffy as-is
    pub layout: taffy::style::Style,

    // Paint
    pub background_color: Option<Color>,
    /// `None` and `1.0` are equivalent; `<= 0.0` hides the subtree
    pub opacity: Option<f32>,
    pub translate_x: f32,
    pub translate_y: f32,
    /// Paint order among siblings, ascending
    pub z_index: i32,

    // Text
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub text_align: Option<TextAlign>,
    pub color: Option<Color>,
    pub font_face: Option<FontFace>,

    // Image
    /// Image source key
    pub src: Option<String>,
    /// Crop anchor in image pixels
    pub focus_point: Option<Point>,
    /// Height the focus point was expressed against
    pub original_height: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            // Children stack vertically unless told otherwise
            layout: taffy::style::Style {
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                ..taffy::style::Style::default()
            },
            background_color: None,
            opacity: None,
            translate_x: 0.0,
            translate_y: 0.0,
            z_index: 0,
            font_size: None,
            line_height: None,
            text_align: None,
            color: None,
            font_face: None,
            src: None,
            focus_point: None,
            original_height: None,
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Size
    // =========================================================================

    /// Set width in pixels
    pub fn w(mut self, px: f32) -> Self {
        self.layout.size.width = Dimension::Length(px);
        self
    }

    /// Set height in pixels
    pub fn h(mut self, px: f32) -> Self {
        self.layout.size.height = Dimension::Length(px);
        self
    }

    /// Set both width and height in pixels
    pub fn size(self, width: f32, height: f32) -> Self {
        self.w(width).h(height)
    }

    /// Set width as a fraction of the parent (1.0 = 100%)
    pub fn w_percent(mut self, fraction: f32) -> Self {
        self.layout.size.width = Dimension::Percent(fraction);
        self
    }

    /// Set height as a fraction of the parent (1.0 = 100%)
    pub fn h_percent(mut self, fraction: f32) -> Self {
        self.layout.size.height = Dimension::Percent(fraction);
        self
    }

    pub fn min_w(mut self, px: f32) -> Self {
        self.layout.min_size.width = Dimension::Length(px);
        self
    }

    pub fn min_h(mut self, px: f32) -> Self {
        self.layout.min_size.height = Dimension::Length(px);
        self
    }

    pub fn max_w(mut self, px: f32) -> Self {
        self.layout.max_size.width = Dimension::Length(px);
        self
    }

    pub fn max_h(mut self, px: f32) -> Self {
        self.layout.max_size.height = Dimension::Length(px);
        self
    }

    // =========================================================================
    // Position
    // =========================================================================

    /// Take the node out of flow; insets become relative to the parent box
    pub fn absolute(mut self) -> Self {
        self.layout.position = Position::Absolute;
        self
    }

    pub fn relative(mut self) -> Self {
        self.layout.position = Position::Relative;
        self
    }

    pub fn left(mut self, px: f32) -> Self {
        self.layout.inset.left = LengthPercentageAuto::Length(px);
        self
    }

    pub fn top(mut self, px: f32) -> Self {
        self.layout.inset.top = LengthPercentageAuto::Length(px);
        self
    }

    pub fn right(mut self, px: f32) -> Self {
        self.layout.inset.right = LengthPercentageAuto::Length(px);
        self
    }

    pub fn bottom(mut self, px: f32) -> Self {
        self.layout.inset.bottom = LengthPercentageAuto::Length(px);
        self
    }

    // =========================================================================
    // Flex Direction
    // =========================================================================

    pub fn flex_row(mut self) -> Self {
        self.layout.flex_direction = FlexDirection::Row;
        self
    }

    pub fn flex_col(mut self) -> Self {
        self.layout.flex_direction = FlexDirection::Column;
        self
    }

    pub fn flex_direction(mut self, direction: FlexDirection) -> Self {
        self.layout.flex_direction = direction;
        self
    }

    pub fn flex_wrap(mut self) -> Self {
        self.layout.flex_wrap = FlexWrap::Wrap;
        self
    }

    // =========================================================================
    // Flex Properties
    // =========================================================================

    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.layout.flex_grow = grow;
        self
    }

    pub fn flex_shrink(mut self, shrink: f32) -> Self {
        self.layout.flex_shrink = shrink;
        self
    }

    pub fn flex_basis(mut self, px: f32) -> Self {
        self.layout.flex_basis = Dimension::Length(px);
        self
    }

    /// `flex: 1` shorthand
    pub fn flex_1(self) -> Self {
        self.flex_grow(1.0).flex_shrink(1.0).flex_basis(0.0)
    }

    // =========================================================================
    // Alignment
    // =========================================================================

    pub fn justify_content(mut self, justify: JustifyContent) -> Self {
        self.layout.justify_content = Some(justify);
        self
    }

    pub fn align_items(mut self, align: AlignItems) -> Self {
        self.layout.align_items = Some(align);
        self
    }

    pub fn align_self(mut self, align: AlignSelf) -> Self {
        self.layout.align_self = Some(align);
        self
    }

    /// Center children on both axes
    pub fn items_center(self) -> Self {
        self.align_items(AlignItems::Center)
            .justify_content(JustifyContent::Center)
    }

    // =========================================================================
    // Spacing
    // =========================================================================

    /// Set uniform padding in pixels
    pub fn padding(mut self, px: f32) -> Self {
        let px = LengthPercentage::Length(px);
        self.layout.padding = taffy::geometry::Rect {
            left: px,
            right: px,
            top: px,
            bottom: px,
        };
        self
    }

    /// Set horizontal and vertical padding in pixels
    pub fn padding_xy(mut self, x: f32, y: f32) -> Self {
        self.layout.padding = taffy::geometry::Rect {
            left: LengthPercentage::Length(x),
            right: LengthPercentage::Length(x),
            top: LengthPercentage::Length(y),
            bottom: LengthPercentage::Length(y),
        };
        self
    }

    /// Set uniform margin in pixels
    pub fn margin(mut self, px: f32) -> Self {
        let px = LengthPercentageAuto::Length(px);
        self.layout.margin = taffy::geometry::Rect {
            left: px,
            right: px,
            top: px,
            bottom: px,
        };
        self
    }

    // =========================================================================
    // Paint
    // =========================================================================

    pub fn bg(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn translate(mut self, x: f32, y: f32) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn font_size(mut self, px: f32) -> Self {
        self.font_size = Some(px);
        self
    }

    pub fn line_height(mut self, px: f32) -> Self {
        self.line_height = Some(px);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn text_center(self) -> Self {
        self.text_align(TextAlign::Center)
    }

    pub fn text_right(self) -> Self {
        self.text_align(TextAlign::Right)
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn font(mut self, font: FontFace) -> Self {
        self.font_face = Some(font);
        self
    }

    // =========================================================================
    // Image
    // =========================================================================

    pub fn src(mut self, key: impl Into<String>) -> Self {
        self.src = Some(key.into());
        self
    }

    pub fn focus_point(mut self, x: f32, y: f32) -> Self {
        self.focus_point = Some(Point::new(x, y));
        self
    }

    pub fn original_height(mut self, px: f32) -> Self {
        self.original_height = Some(px);
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Opacity at or below zero: the node and its subtree are not painted
    pub fn is_hidden(&self) -> bool {
        self.opacity.is_some_and(|o| o <= 0.0)
    }

    /// Partial opacity or a translation that must apply to the whole subtree
    pub fn needs_layer(&self) -> bool {
        self.opacity.is_some_and(|o| o < 1.0) || self.translate_x != 0.0 || self.translate_y != 0.0
    }

    /// Text parameters with any missing value taken from the stock defaults
    pub fn text_params(&self) -> TextParams {
        TextParams::from_style(self, &TextDefaults::default())
    }

    /// Whether switching from `self` to `other` changes how text breaks
    pub fn text_layout_changed(&self, other: &Style) -> bool {
        self.font_size != other.font_size
            || self.line_height != other.line_height
            || self.font_face != other.font_face
    }
}

/// Fully resolved text parameters of a text node
#[derive(Clone, Debug, PartialEq)]
pub struct TextParams {
    pub font: FontFace,
    pub font_size: f32,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub color: Color,
}

impl TextParams {
    fn from_style(style: &Style, defaults: &TextDefaults) -> Self {
        Self {
            font: style
                .font_face
                .clone()
                .unwrap_or_else(|| defaults.font_face()),
            font_size: style.font_size.unwrap_or(defaults.font_size),
            line_height: style.line_height.unwrap_or(defaults.line_height),
            text_align: style.text_align.unwrap_or(defaults.text_align),
            color: style.color.unwrap_or(defaults.color),
        }
    }
}

/// Merges declared styles with type-specific defaults
#[derive(Clone, Debug, Default)]
pub struct StyleResolver {
    text: TextDefaults,
}

impl StyleResolver {
    pub fn new(text: TextDefaults) -> Self {
        Self { text }
    }

    pub fn text_defaults(&self) -> &TextDefaults {
        &self.text
    }

    /// Resolve a declared style for a node of `kind`
    ///
    /// Text nodes get every unset text property filled in; other kinds are
    /// returned as declared.
    pub fn resolve(&self, kind: NodeKind, declared: &Style) -> Style {
        let mut style = declared.clone();
        if kind == NodeKind::Text {
            let params = TextParams::from_style(declared, &self.text);
            style.font_size = Some(params.font_size);
            style.line_height = Some(params.line_height);
            style.text_align = Some(params.text_align);
            style.color = Some(params.color);
            style.font_face = Some(params.font);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_column_flex() {
        let style = Style::default();
        assert_eq!(style.layout.flex_direction, FlexDirection::Column);
        assert_eq!(style.z_index, 0);
        assert!(!style.is_hidden());
        assert!(!style.needs_layer());
    }

    #[test]
    fn test_builders() {
        let style = Style::new().size(150.0, 100.0).left(5.0).bg(Color::RED);
        assert_eq!(style.layout.size.width, Dimension::Length(150.0));
        assert_eq!(style.layout.size.height, Dimension::Length(100.0));
        assert_eq!(style.layout.inset.left, LengthPercentageAuto::Length(5.0));
        assert_eq!(style.background_color, Some(Color::RED));
    }

    #[test]
    fn test_opacity_queries() {
        assert!(Style::new().opacity(0.0).is_hidden());
        assert!(Style::new().opacity(-1.0).is_hidden());
        assert!(Style::new().opacity(0.5).needs_layer());
        assert!(!Style::new().opacity(1.0).needs_layer());
        assert!(Style::new().translate(0.0, 3.0).needs_layer());
    }

    #[test]
    fn test_resolver_fills_text_defaults() {
        let resolver = StyleResolver::default();
        let style = resolver.resolve(NodeKind::Text, &Style::new().font_size(20.0));

        assert_eq!(style.font_size, Some(20.0));
        assert_eq!(style.line_height, Some(18.0));
        assert_eq!(style.text_align, Some(TextAlign::Left));
        assert_eq!(style.color, Some(Color::BLACK));
        assert_eq!(style.font_face, Some(FontFace::default()));
    }

    #[test]
    fn test_resolver_leaves_boxes_alone() {
        let resolver = StyleResolver::default();
        let declared = Style::new().w(10.0);
        assert_eq!(resolver.resolve(NodeKind::Box, &declared), declared);
    }

    #[test]
    fn test_resolver_uses_configured_defaults() {
        let defaults = TextDefaults {
            font_size: 12.0,
            color: Color::BLUE,
            ..TextDefaults::default()
        };
        let style = StyleResolver::new(defaults).resolve(NodeKind::Text, &Style::new());
        assert_eq!(style.text_params().font_size, 12.0);
        assert_eq!(style.text_params().color, Color::BLUE);
    }

    #[test]
    fn test_text_layout_changed() {
        let a = Style::new().font_size(16.0);
        assert!(a.text_layout_changed(&Style::new().font_size(18.0)));
        assert!(!a.text_layout_changed(&a.clone().color(Color::RED)));
    }
}
