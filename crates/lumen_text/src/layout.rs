//! Line breaking and text metrics
//!
//! Breaks text greedily at Unicode line-break opportunities (UAX #14):
//! each line takes as many segments as fit in the available width,
//! mandatory breaks always end a line, and a single segment wider than the
//! available width gets a line of its own rather than being split.

use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;
use unicode_linebreak::{linebreaks, BreakOpportunity};

use lumen_core::FontFace;

use crate::font::FontReadiness;
use crate::measure::TextMeasurer;

/// Marker drawn in place of a truncated trailing word
pub const ELLIPSIS: &str = "…";

/// A single broken line
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// Rendered width in pixels
    pub width: f32,
}

/// Line-broken layout of a text run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextMetrics {
    /// Width of the widest line
    pub width: f32,
    /// Number of lines × line height
    pub height: f32,
    /// Available width the lines were broken for (None = unbounded)
    pub max_width: Option<f32>,
    pub lines: SmallVec<[Line; 4]>,
}

impl TextMetrics {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether these metrics were computed for the given available width
    pub fn matches_width(&self, max_width: Option<f32>) -> bool {
        match (self.max_width, max_width) {
            (None, None) => true,
            (Some(a), Some(b)) => (a - b).abs() < 0.01,
            _ => false,
        }
    }

    /// Whether breaking for `width` would produce these same lines
    ///
    /// Holds when every line already fits and the metrics were broken for
    /// an equal or wider limit: greedy breaking makes identical choices.
    pub fn fits_width(&self, width: f32) -> bool {
        const EPSILON: f32 = 0.01;
        self.width <= width + EPSILON && self.max_width.map_or(true, |limit| limit + EPSILON >= width)
    }
}

/// Parameters for a single layout computation
#[derive(Debug, Clone, Copy)]
pub struct TextLayoutRequest<'a> {
    pub text: &'a str,
    pub max_width: Option<f32>,
    pub font: &'a FontFace,
    pub font_size: f32,
    pub line_height: f32,
}

/// Break `text` into lines no wider than `max_width` where possible
pub fn break_lines(
    text: &str,
    max_width: Option<f32>,
    font: &FontFace,
    font_size: f32,
    measurer: &dyn TextMeasurer,
) -> SmallVec<[Line; 4]> {
    let mut lines = SmallVec::new();
    if text.is_empty() {
        return lines;
    }

    let fits = |candidate: &str| match max_width {
        Some(limit) => measurer.measure(candidate.trim_end(), font, font_size) <= limit,
        None => true,
    };
    let push_line = |lines: &mut SmallVec<[Line; 4]>, line: &str| {
        let text = line.trim_end().to_string();
        let width = measurer.measure(&text, font, font_size);
        lines.push(Line { text, width });
    };

    let mut current = String::new();
    let mut start = 0;

    for (end, opportunity) in linebreaks(text) {
        let segment = &text[start..end];
        start = end;

        if !current.is_empty() && !fits(&format!("{current}{segment}")) {
            push_line(&mut lines, &current);
            current.clear();
        }
        current.push_str(segment);

        if opportunity == BreakOpportunity::Mandatory {
            push_line(&mut lines, &current);
            current.clear();
        }
    }

    if !current.is_empty() {
        push_line(&mut lines, &current);
    }

    lines
}

/// Replace the trailing word of a line (with an optional preceding comma
/// and space) by an ellipsis
///
/// Lines without a trailing word character are returned unchanged.
pub fn truncate_with_ellipsis(line: &str) -> String {
    static TRAILING_WORD: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING_WORD
        .get_or_init(|| Regex::new(r",?\s?\w+$").expect("trailing word pattern is valid"));
    re.replace(line, ELLIPSIS).into_owned()
}

/// Computes line-broken metrics once a node's font is ready
pub struct TextLayoutAdapter {
    measurer: Box<dyn TextMeasurer>,
    fonts: Box<dyn FontReadiness>,
}

impl TextLayoutAdapter {
    pub fn new(
        measurer: impl TextMeasurer + 'static,
        fonts: impl FontReadiness + 'static,
    ) -> Self {
        Self {
            measurer: Box::new(measurer),
            fonts: Box::new(fonts),
        }
    }

    pub fn is_font_ready(&self, font: &FontFace) -> bool {
        self.fonts.is_font_ready(font)
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    /// Lay out a run of text
    ///
    /// Returns `None` while the font is not ready; callers treat that as an
    /// empty `{0, 0}` box and try again on a later frame.
    pub fn layout(&self, request: &TextLayoutRequest<'_>) -> Option<TextMetrics> {
        if !self.fonts.is_font_ready(request.font) {
            tracing::debug!(
                "Font {:?} not ready, deferring text layout",
                request.font.family
            );
            return None;
        }

        let lines = break_lines(
            request.text,
            request.max_width,
            request.font,
            request.font_size,
            self.measurer.as_ref(),
        );
        let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
        let height = lines.len() as f32 * request.line_height;

        Some(TextMetrics {
            width,
            height,
            max_width: request.max_width,
            lines,
        })
    }
}

impl std::fmt::Debug for TextLayoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutAdapter").finish_non_exhaustive()
    }
}
