//! Slice geometry: where a fragment lands and what confines it.

use kurbo::{BezPath, Ellipse, Rect, Shape};

/// Magnification applied to fragment display dimensions.
pub const DISPLAY_SCALE: f64 = 3.0;

/// Half-range of the per-slice clip rotation jitter (±5°).
pub const CLIP_ROTATE_RANGE: f64 = std::f64::consts::PI / 18.0;

/// Fraction of each fragment dimension covered by the draw-position jitter.
pub const SHIFT_JITTER_SCALE: f64 = 0.25;

pub fn slice_width(canvas_width: u32, fragment_count: usize) -> f64 {
    f64::from(canvas_width) / fragment_count as f64
}

/// Fragment device size: display dimensions magnified by [`DISPLAY_SCALE`],
/// then scaled down uniformly so neither side exceeds the magnified canvas
/// width. Scaling both sides together keeps the aspect ratio intact.
pub fn clamped_display_size(
    display_width: f64,
    display_height: f64,
    canvas_width: u32,
) -> (f64, f64) {
    let w = display_width * DISPLAY_SCALE;
    let h = display_height * DISPLAY_SCALE;
    let limit = f64::from(canvas_width) * DISPLAY_SCALE;
    let scale = (limit / w).min(limit / h).min(1.0);
    (w * scale, h * scale)
}

/// Energy maps linearly onto the vertical axis: 0 sits at the bottom edge,
/// 0.5 at center, 1 at the top.
pub fn vertical_position(canvas_height: u32, energy: f64) -> f64 {
    let h = f64::from(canvas_height);
    h / 2.0 - h * (energy - 0.5)
}

/// Clip region for one slice, in the slice's local frame: two overlapping
/// ellipses give the organic boundary, and a rectangle spanning everything
/// to the upper-left of the anchor closes the region against the canvas
/// edge. Nonzero winding unions the three shapes.
pub fn slice_clip_path(
    slice_width: f64,
    canvas_width: u32,
    canvas_height: u32,
    position_x: f64,
    position_y: f64,
) -> BezPath {
    let w = f64::from(canvas_width);
    let h = f64::from(canvas_height);

    let upper = Ellipse::new((0.0, -w * 0.25), (slice_width * 1.2, h * 0.6), 0.0);
    let lower = Ellipse::new((w * 0.1, w * 0.25), (slice_width * 1.4, h * 0.6), 6.2);
    let corner = Rect::new(-position_x, -position_y, 0.0, 0.0);

    let mut path = BezPath::new();
    path.extend(upper.path_elements(0.1));
    path.extend(lower.path_elements(0.1));
    path.extend(corner.path_elements(0.1));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn energy_maps_linearly_to_vertical_position() {
        assert_eq!(vertical_position(100, 0.5), 50.0);
        assert_eq!(vertical_position(100, 1.0), 0.0);
        assert_eq!(vertical_position(100, 0.0), 100.0);
        assert_eq!(vertical_position(300, 0.9), 300.0 / 2.0 - 300.0 * 0.4);
    }

    #[test]
    fn clamp_is_identity_when_within_bounds() {
        let (w, h) = clamped_display_size(100.0, 50.0, 400);
        assert_eq!(w, 300.0);
        assert_eq!(h, 150.0);
    }

    #[test]
    fn clamp_preserves_aspect_ratio() {
        let (w, h) = clamped_display_size(800.0, 200.0, 400);
        assert!(w <= 400.0 * DISPLAY_SCALE + 1e-9);
        assert!(h <= 400.0 * DISPLAY_SCALE + 1e-9);
        assert!((w / h - 4.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_handles_tall_fragments() {
        let (w, h) = clamped_display_size(200.0, 900.0, 400);
        assert!(h <= 400.0 * DISPLAY_SCALE + 1e-9);
        assert!((h / w - 4.5).abs() < 1e-9);
    }

    #[test]
    fn slice_width_divides_canvas_evenly() {
        assert_eq!(slice_width(400, 2), 200.0);
        assert_eq!(slice_width(400, 1), 400.0);
    }

    #[test]
    fn clip_path_covers_local_origin_region() {
        let path = slice_clip_path(200.0, 400, 300, 200.0, 150.0);
        // Inside the upper ellipse.
        assert_ne!(path.winding(Point::new(0.0, -100.0)), 0);
        // Inside the upper-left rectangle.
        assert_ne!(path.winding(Point::new(-100.0, -100.0)), 0);
        // Far right of the slice, outside everything.
        assert_eq!(path.winding(Point::new(1200.0, 0.0)), 0);
    }
}
