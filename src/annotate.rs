//! Renders the selected segments and a translucent frame onto a color image.

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut},
    rect::Rect,
};
use rayon::prelude::*;

use crate::config::AnnotationStyle;
use crate::geometry::Segment;

/// Returns a copy of `image` with both segments drawn and the frame blended in.
///
/// # Arguments
///
/// * `image` - Color image the segments were detected in
/// * `segments` - Longest and second-longest segment
/// * `style` - Color, stroke width and frame settings
///
/// # Returns
///
/// A new image; `image` itself is left untouched. The frame is blended after
/// the segments are drawn, so it also tints their ends near the border.
///
/// # Examples
///
/// ```rust
/// use image::{Rgb, RgbImage};
/// use runway_lines::{AnnotationStyle, Segment, annotate};
///
/// let image = RgbImage::new(64, 64);
/// let style = AnnotationStyle::default();
/// let annotated = annotate(
///     &image,
///     (Segment::new(0, 32, 63, 32), Segment::new(32, 0, 32, 63)),
///     &style,
/// );
/// assert_eq!(annotated.get_pixel(10, 32), &Rgb([0, 255, 0]));
/// ```
pub fn annotate(image: &RgbImage, segments: (Segment, Segment), style: &AnnotationStyle) -> RgbImage {
    let mut canvas = image.clone();
    draw_segment_mut(&mut canvas, &segments.0, style.line_color, style.line_thickness);
    draw_segment_mut(&mut canvas, &segments.1, style.line_color, style.line_thickness);
    blend_border_mut(
        &mut canvas,
        style.border_color,
        style.border_thickness,
        style.border_opacity,
    );
    canvas
}

/// Draws a segment with a roughly round pen of the given thickness.
pub fn draw_segment_mut(canvas: &mut RgbImage, segment: &Segment, color: Rgb<u8>, thickness: u32) {
    let radius = (thickness.max(1) / 2) as i32;
    let start = (segment.x1 as f32, segment.y1 as f32);
    let end = (segment.x2 as f32, segment.y2 as f32);

    for oy in -radius..=radius {
        for ox in -radius..=radius {
            if ox * ox + oy * oy > radius * radius {
                continue;
            }
            let (ox, oy) = (ox as f32, oy as f32);
            draw_line_segment_mut(
                canvas,
                (start.0 + ox, start.1 + oy),
                (end.0 + ox, end.1 + oy),
                color,
            );
        }
    }
}

/// Blends a hollow full-frame rectangle over `canvas`.
///
/// The rectangle's outline is centred on the image boundary, so only its
/// inner half (`thickness / 2` pixels, plus the boundary row on the top and
/// left) lands inside the image. Each channel becomes
/// `opacity * overlay + (1 - opacity) * canvas`, rounded.
pub fn blend_border_mut(canvas: &mut RgbImage, color: Rgb<u8>, thickness: u32, opacity: f32) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 || thickness == 0 {
        return;
    }

    let mut overlay = canvas.clone();
    let half = thickness / 2;
    let near = (half + 1).min(width).min(height);
    let far_x = half.min(width);
    let far_y = half.min(height);

    // top, left, bottom, right
    draw_filled_rect_mut(&mut overlay, Rect::at(0, 0).of_size(width, near), color);
    draw_filled_rect_mut(&mut overlay, Rect::at(0, 0).of_size(near, height), color);
    if far_y > 0 {
        let top = (height - far_y) as i32;
        draw_filled_rect_mut(&mut overlay, Rect::at(0, top).of_size(width, far_y), color);
    }
    if far_x > 0 {
        let left = (width - far_x) as i32;
        draw_filled_rect_mut(&mut overlay, Rect::at(left, 0).of_size(far_x, height), color);
    }

    let alpha = opacity.clamp(0.0, 1.0);
    let pixels: &mut [u8] = canvas;
    pixels
        .par_iter_mut()
        .zip(overlay.as_raw().par_iter())
        .for_each(|(dst, src)| {
            let mixed = f32::from(*src) * alpha + f32::from(*dst) * (1.0 - alpha);
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

    fn gray_canvas(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([100, 100, 100]))
    }

    #[test]
    fn thick_line_covers_neighbouring_rows() {
        let mut canvas = gray_canvas(40, 40);
        draw_segment_mut(&mut canvas, &Segment::new(5, 20, 34, 20), GREEN, 3);

        for y in 19..=21 {
            assert_eq!(canvas.get_pixel(20, y), &GREEN, "row {y}");
        }
        assert_eq!(canvas.get_pixel(20, 18), &Rgb([100, 100, 100]));
        assert_eq!(canvas.get_pixel(20, 22), &Rgb([100, 100, 100]));
    }

    #[test]
    fn thin_line_is_single_pixel() {
        let mut canvas = gray_canvas(20, 20);
        draw_segment_mut(&mut canvas, &Segment::new(0, 10, 19, 10), GREEN, 1);
        assert_eq!(canvas.get_pixel(7, 10), &GREEN);
        assert_eq!(canvas.get_pixel(7, 9), &Rgb([100, 100, 100]));
        assert_eq!(canvas.get_pixel(7, 11), &Rgb([100, 100, 100]));
    }

    #[test]
    fn border_is_faint_and_interior_untouched() {
        let mut canvas = gray_canvas(50, 40);
        blend_border_mut(&mut canvas, GREEN, 10, 0.05);

        // 0.05 * 0 + 0.95 * 100 = 95, 0.05 * 255 + 0.95 * 100 = 107.75
        let framed = Rgb([95, 108, 95]);
        assert_eq!(canvas.get_pixel(0, 0), &framed);
        assert_eq!(canvas.get_pixel(5, 20), &framed);
        assert_eq!(canvas.get_pixel(45, 20), &framed);
        assert_eq!(canvas.get_pixel(25, 35), &framed);
        assert_eq!(canvas.get_pixel(25, 5), &framed);

        assert_eq!(canvas.get_pixel(6, 20), &Rgb([100, 100, 100]));
        assert_eq!(canvas.get_pixel(44, 20), &Rgb([100, 100, 100]));
        assert_eq!(canvas.get_pixel(25, 34), &Rgb([100, 100, 100]));
        assert_eq!(canvas.get_pixel(25, 20), &Rgb([100, 100, 100]));
    }

    #[test]
    fn zero_opacity_is_a_no_op() {
        let mut canvas = gray_canvas(16, 16);
        blend_border_mut(&mut canvas, GREEN, 10, 0.0);
        assert_eq!(canvas, gray_canvas(16, 16));
    }

    #[test]
    fn annotate_leaves_source_untouched() {
        let source = gray_canvas(30, 30);
        let segments = (Segment::new(0, 0, 29, 29), Segment::new(0, 29, 29, 0));
        let annotated = annotate(&source, segments, &AnnotationStyle::default());

        assert_eq!(source, gray_canvas(30, 30));
        assert_eq!(annotated.dimensions(), (30, 30));
        assert_eq!(annotated.get_pixel(15, 15), &GREEN);
        assert_eq!(annotated.get_pixel(15, 8), &Rgb([100, 100, 100]));
    }

    #[test]
    fn tiny_image_does_not_panic() {
        let source = gray_canvas(1, 1);
        let segments = (Segment::new(0, 0, 0, 0), Segment::new(0, 0, 0, 0));
        let annotated = annotate(&source, segments, &AnnotationStyle::default());
        assert_eq!(annotated.dimensions(), (1, 1));
    }
}
