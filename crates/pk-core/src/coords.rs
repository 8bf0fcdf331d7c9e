//! Coordinate transforms between the three spaces the editors work in.
//!
//! * **Relative** — percentages (0–100) of the original, unscaled product
//!   image. Canvas-size-independent; the only representation that is
//!   persisted.
//! * **Absolute** — pixels within the current editing canvas.
//! * **Scaled-image** — pixels after the product photo has been
//!   letterbox-fitted ("contain") into the canvas.
//!
//! All functions are pure and deterministic. Degenerate inputs (zero-size
//! image or canvas) produce best-effort geometry instead of panicking;
//! callers guard against missing images before asking for transforms.

use serde::{Deserialize, Serialize};

/// A pixel position in whatever coordinate space is contextually active.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Width/height pair (image, canvas, or reference dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Standard canvas dimensions shared by the admin editors and the
/// customer-facing renderer, so relative coordinates line up everywhere.
pub const STANDARD_CANVAS_SIZE: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// A region in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AbsCoords {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AbsCoords {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A region as percentages (0–100) of a reference image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelCoords {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RelCoords {
    /// All components in [0, 100] and the region inside the unit box.
    pub fn is_valid(&self) -> bool {
        (0.0..=100.0).contains(&self.x)
            && (0.0..=100.0).contains(&self.y)
            && (0.0..=100.0).contains(&self.width)
            && (0.0..=100.0).contains(&self.height)
            && self.x + self.width <= 100.0
            && self.y + self.height <= 100.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// How a source image was fitted into a fixed canvas: offset, scaled size,
/// and the derived per-axis scale factors. Recomputed whenever the image
/// or canvas size changes; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// "Contain"-fit an image into a canvas, preserving aspect ratio and
/// centering the result. The binding axis exactly fills the canvas; the
/// other axis is offset by half the slack.
pub fn scale_image_to_canvas(image: Size, canvas: Size) -> ImageTransform {
    if image.width <= 0.0 || image.height <= 0.0 {
        // Degenerate image: collapse to a centered zero-size transform.
        return ImageTransform {
            left: canvas.width / 2.0,
            top: canvas.height / 2.0,
            width: 0.0,
            height: 0.0,
            scale_x: 0.0,
            scale_y: 0.0,
        };
    }

    let image_aspect = image.width / image.height;
    let canvas_aspect = canvas.width / canvas.height;

    let (new_width, new_height) = if image_aspect > canvas_aspect {
        // Image is wider than the canvas: width binds.
        (canvas.width, canvas.width / image_aspect)
    } else {
        // Image is taller than the canvas: height binds.
        (canvas.height * image_aspect, canvas.height)
    };

    ImageTransform {
        left: (canvas.width - new_width) / 2.0,
        top: (canvas.height - new_height) / 2.0,
        width: new_width,
        height: new_height,
        scale_x: new_width / image.width,
        scale_y: new_height / image.height,
    }
}

/// Pixels → percentages of a reference size.
pub fn absolute_to_relative(abs: AbsCoords, reference: Size) -> RelCoords {
    if reference.width <= 0.0 || reference.height <= 0.0 {
        return RelCoords::default();
    }
    RelCoords {
        x: (abs.x / reference.width) * 100.0,
        y: (abs.y / reference.height) * 100.0,
        width: (abs.width / reference.width) * 100.0,
        height: (abs.height / reference.height) * 100.0,
    }
}

/// Percentages of a reference size → pixels.
pub fn relative_to_absolute(rel: RelCoords, target: Size) -> AbsCoords {
    AbsCoords {
        x: (rel.x / 100.0) * target.width,
        y: (rel.y / 100.0) * target.height,
        width: (rel.width / 100.0) * target.width,
        height: (rel.height / 100.0) * target.height,
    }
}

/// Map a percentage region of the *original image* into canvas pixel
/// space: resolve it against the scaled image size, then add the fit
/// offset. Single source of truth for "where does this print area appear
/// on screen right now" — both editors must go through this.
pub fn print_area_on_scaled_image(rel: RelCoords, transform: &ImageTransform) -> AbsCoords {
    AbsCoords {
        x: (rel.x / 100.0) * transform.width + transform.left,
        y: (rel.y / 100.0) * transform.height + transform.top,
        width: (rel.width / 100.0) * transform.width,
        height: (rel.height / 100.0) * transform.height,
    }
}

/// Canvas-pixel box → percentages of the scaled image, clamped to the
/// image bounds. Inverse of [`print_area_on_scaled_image`] for in-bounds
/// regions.
pub fn canvas_to_image_coords(abs: AbsCoords, transform: &ImageTransform) -> RelCoords {
    if transform.width <= 0.0 || transform.height <= 0.0 {
        return RelCoords::default();
    }
    let x = ((abs.x - transform.left) / transform.width) * 100.0;
    let y = ((abs.y - transform.top) / transform.height) * 100.0;
    let width = (abs.width / transform.width) * 100.0;
    let height = (abs.height / transform.height) * 100.0;

    let cx = x.clamp(0.0, 100.0);
    let cy = y.clamp(0.0, 100.0);
    RelCoords {
        x: cx,
        y: cy,
        width: width.clamp(0.0, 100.0 - cx),
        height: height.clamp(0.0, 100.0 - cy),
    }
}

/// Clamp a relative region into the valid [0, 100] box, shrinking
/// width/height when the position pushes them over the edge.
pub fn clamp_rel(rel: RelCoords) -> RelCoords {
    let x = rel.x.clamp(0.0, 100.0);
    let y = rel.y.clamp(0.0, 100.0);
    let mut width = rel.width.clamp(0.0, 100.0);
    let mut height = rel.height.clamp(0.0, 100.0);

    if x + width > 100.0 {
        width = 100.0 - x;
    }
    if y + height > 100.0 {
        height = 100.0 - y;
    }
    RelCoords {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f32 = 1e-3;

    #[test]
    fn contain_fit_wide_image_binds_width() {
        let t = scale_image_to_canvas(Size::new(1600.0, 400.0), STANDARD_CANVAS_SIZE);
        assert!((t.width - 800.0).abs() < EPS);
        assert!((t.height - 200.0).abs() < EPS);
        assert!((t.left - 0.0).abs() < EPS);
        assert!((t.top - 200.0).abs() < EPS); // (600 - 200) / 2
    }

    #[test]
    fn contain_fit_tall_image_binds_height() {
        let t = scale_image_to_canvas(Size::new(600.0, 780.0), STANDARD_CANVAS_SIZE);
        assert!((t.height - 600.0).abs() < EPS);
        let expected_width = 600.0 * (600.0 / 780.0);
        assert!((t.width - expected_width).abs() < EPS);
        assert!((t.left - (800.0 - expected_width) / 2.0).abs() < EPS);
        assert!((t.top - 0.0).abs() < EPS);
    }

    #[test]
    fn contain_fit_degenerate_image_does_not_panic() {
        let t = scale_image_to_canvas(Size::new(0.0, 0.0), STANDARD_CANVAS_SIZE);
        assert_eq!(t.width, 0.0);
        assert_eq!(t.scale_x, 0.0);
    }

    #[test]
    fn relative_absolute_roundtrip() {
        let rel = RelCoords {
            x: 12.5,
            y: 40.0,
            width: 30.0,
            height: 22.0,
        };
        let abs = relative_to_absolute(rel, STANDARD_CANVAS_SIZE);
        let back = absolute_to_relative(abs, STANDARD_CANVAS_SIZE);
        assert!((back.x - rel.x).abs() < EPS);
        assert!((back.y - rel.y).abs() < EPS);
        assert!((back.width - rel.width).abs() < EPS);
        assert!((back.height - rel.height).abs() < EPS);
    }

    #[test]
    fn print_area_placement_adds_fit_offset() {
        let transform = scale_image_to_canvas(Size::new(400.0, 600.0), STANDARD_CANVAS_SIZE);
        let rel = RelCoords {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let abs = print_area_on_scaled_image(rel, &transform);
        assert!((abs.x - transform.left).abs() < EPS);
        assert!((abs.y - transform.top).abs() < EPS);
        assert!((abs.width - transform.width).abs() < EPS);
        assert!((abs.height - transform.height).abs() < EPS);
    }

    #[test]
    fn canvas_to_image_is_inverse_inside_bounds() {
        let transform = scale_image_to_canvas(Size::new(1000.0, 500.0), STANDARD_CANVAS_SIZE);
        let rel = RelCoords {
            x: 10.0,
            y: 20.0,
            width: 25.0,
            height: 50.0,
        };
        let abs = print_area_on_scaled_image(rel, &transform);
        let back = canvas_to_image_coords(abs, &transform);
        assert!((back.x - rel.x).abs() < EPS);
        assert!((back.y - rel.y).abs() < EPS);
        assert!((back.width - rel.width).abs() < EPS);
        assert!((back.height - rel.height).abs() < EPS);
    }

    #[test]
    fn clamp_shrinks_overflowing_region() {
        let rel = clamp_rel(RelCoords {
            x: 80.0,
            y: -5.0,
            width: 40.0,
            height: 200.0,
        });
        assert!(rel.is_valid());
        assert_eq!(rel.x, 80.0);
        assert_eq!(rel.y, 0.0);
        assert_eq!(rel.width, 20.0);
        assert_eq!(rel.height, 100.0);
    }
}
