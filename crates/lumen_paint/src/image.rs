//! Image fitting and cropping
//!
//! Images cover their box: they are scaled uniformly until both sides
//! reach the box, then cropped around a focus point. The crop origin is
//! clamped to the image, so a focus point near an edge pins the crop to
//! that edge.

use lumen_core::{DrawSurface, Point, Rect};
use lumen_image::ImageCache;
use lumen_layout::LayoutBox;

/// Source region of the image and where it lands on the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageCrop {
    pub src: Rect,
    pub dst: Rect,
}

/// Rounds half-way cases up, toward positive infinity
fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// `value` limited below by `min` first and above by `max` second
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Compute the crop for an image of `natural` size drawn into `target`
///
/// A zero target width or height takes the image's natural one.
/// `focus_point` is in image pixels; when `original_height` is given the
/// point was expressed against an image of that height and is rescaled.
pub fn compute_crop(
    natural: (u32, u32),
    target: Rect,
    focus_point: Option<Point>,
    original_height: Option<f32>,
) -> ImageCrop {
    let natural_width = natural.0 as f32;
    let natural_height = natural.1 as f32;

    let width = if target.width() == 0.0 {
        natural_width
    } else {
        target.width()
    };
    let height = if target.height() == 0.0 {
        natural_height
    } else {
        target.height()
    };

    let mut scale = (width / natural_width).max(height / natural_height);
    if !scale.is_finite() || scale == 0.0 {
        scale = 1.0;
    }
    scale = (scale * 10_000.0).round() / 10_000.0;

    let focus = match focus_point {
        Some(point) => match original_height {
            Some(original) if original > 0.0 => {
                let ratio = natural_height / original;
                Point::new(point.x * ratio, point.y * ratio)
            }
            _ => point,
        },
        None => Point::new(natural_width * 0.5, natural_height * 0.5),
    };

    let scaled_width = natural_width * scale;
    let scaled_height = natural_height * scale;

    let sx = round_half_up(clamp(width * 0.5 - focus.x * scale, width - scaled_width, 0.0))
        * (-1.0 / scale);
    let sy = round_half_up(clamp(height * 0.5 - focus.y * scale, height - scaled_height, 0.0))
        * (-1.0 / scale);
    let sw = round_half_up(natural_width - sx * 2.0);
    let sh = round_half_up(natural_height - sy * 2.0);

    ImageCrop {
        src: Rect::new(sx, sy, sw, sh),
        dst: Rect::new(
            round_half_up(target.x()),
            round_half_up(target.y()),
            round_half_up(width),
            round_half_up(height),
        ),
    }
}

/// Draw an image node's source, if it has finished loading
///
/// Returns whether anything was drawn.
pub fn draw_image(
    surface: &mut dyn DrawSurface,
    images: &mut ImageCache,
    src: &str,
    bounds: &LayoutBox,
    focus_point: Option<Point>,
    original_height: Option<f32>,
) -> bool {
    let resource = images.get(src);
    let Some(image) = resource.as_image_ref() else {
        return false;
    };

    let crop = compute_crop(
        (image.width, image.height),
        bounds.rect(),
        focus_point,
        original_height,
    );
    surface.draw_image(image, crop.src, crop.dst);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_crop_of_wide_image() {
        // 400x200 into a 100x100 box: scale 0.5, keep the middle 200x200
        let crop = compute_crop((400, 200), Rect::new(0.0, 0.0, 100.0, 100.0), None, None);
        assert_eq!(crop.src, Rect::new(100.0, 0.0, 200.0, 200.0));
        assert_eq!(crop.dst, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_centered_crop_of_tall_image() {
        let crop = compute_crop((100, 300), Rect::new(10.0, 20.0, 100.0, 100.0), None, None);
        assert_eq!(crop.src, Rect::new(0.0, 100.0, 100.0, 100.0));
        assert_eq!(crop.dst, Rect::new(10.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_same_aspect_uses_whole_image() {
        let crop = compute_crop((200, 100), Rect::new(0.0, 0.0, 100.0, 50.0), None, None);
        assert_eq!(crop.src, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_zero_box_takes_natural_size() {
        let crop = compute_crop((64, 32), Rect::new(5.0, 5.0, 0.0, 0.0), None, None);
        assert_eq!(crop.src, Rect::new(0.0, 0.0, 64.0, 32.0));
        assert_eq!(crop.dst, Rect::new(5.0, 5.0, 64.0, 32.0));
    }

    #[test]
    fn test_focus_point_is_clamped_inside_image() {
        // Focus on the far left edge: the crop starts at x = 0
        let crop = compute_crop(
            (400, 200),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(Point::new(0.0, 100.0)),
            None,
        );
        assert_eq!(crop.src.x(), 0.0);
        assert_eq!(crop.src.y(), 0.0);
    }

    #[test]
    fn test_focus_point_rescaled_by_original_height() {
        // Focus (600, 200) on a 400px tall original is (300, 100) at 200px
        let scaled = compute_crop(
            (400, 200),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(Point::new(600.0, 200.0)),
            Some(400.0),
        );
        let direct = compute_crop(
            (400, 200),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(Point::new(300.0, 100.0)),
            None,
        );
        assert_eq!(scaled, direct);
        assert_eq!(direct.src.x(), 200.0);
    }

    #[test]
    fn test_degenerate_image_scale_falls_back_to_one() {
        let crop = compute_crop((0, 0), Rect::new(0.0, 0.0, 10.0, 10.0), None, None);
        assert_eq!(crop.src, Rect::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(crop.dst, Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
