//! Drawing laid-out text

use lumen_core::{DrawSurface, Point, TextAlign, TextStyle};
use lumen_layout::{LayoutBox, TextParams};
use lumen_text::{truncate_with_ellipsis, TextMetrics};

/// Draw the lines of `metrics` inside `bounds`
///
/// Baselines start one font size below the top of the box and advance by
/// the line height. A line followed by one that would not fit in the box
/// gets its trailing word replaced by an ellipsis; lines whose baseline
/// falls below the box are skipped. Returns the number of lines drawn.
pub fn draw_text(
    surface: &mut dyn DrawSurface,
    metrics: &TextMetrics,
    params: &TextParams,
    bounds: &LayoutBox,
) -> usize {
    let style = TextStyle::new(params.font_size)
        .with_color(params.color)
        .with_font(params.font.clone());

    let line_count = metrics.lines.len();
    let mut drawn = 0;

    for (index, line) in metrics.lines.iter().enumerate() {
        let y = bounds.top + params.font_size + params.line_height * index as f32;
        if y > bounds.top + bounds.height {
            continue;
        }

        let x = match params.text_align {
            TextAlign::Left => bounds.left,
            TextAlign::Center => bounds.left + bounds.width / 2.0 - line.width / 2.0,
            TextAlign::Right => bounds.left + bounds.width - line.width,
        };

        let next_overflows =
            params.font_size + params.line_height * (index + 1) as f32 > bounds.height;
        if index + 1 < line_count && next_overflows {
            let truncated = truncate_with_ellipsis(&line.text);
            surface.fill_text(&truncated, Point::new(x, y), &style);
        } else {
            surface.fill_text(&line.text, Point::new(x, y), &style);
        }
        drawn += 1;
    }

    drawn
}
