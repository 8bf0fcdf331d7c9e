//! Hit testing: point → element / handle / area lookup.
//!
//! Elements are drawn in list order, so the topmost candidate is the last
//! match walking the list in reverse. Rotated elements are tested by
//! inverse-rotating the pointer about the element center instead of
//! rotating the rectangle.

use kurbo::{Affine, Point as KPoint};
use pk_core::coords::{AbsCoords, ImageTransform, Point, print_area_on_scaled_image};
use pk_core::id::ItemId;
use pk_core::model::{PrintArea, TemplateElement};

/// Diameter of the corner control handles, in canvas px.
pub const HANDLE_SIZE: f32 = 24.0;

/// The four corner controls of a selected area or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Top-left.
    Delete,
    /// Top-right.
    Rotate,
    /// Bottom-left.
    Move,
    /// Bottom-right.
    Resize,
}

/// Does `p` fall inside `bounds` once the rectangle's rotation (degrees,
/// about its center) is taken into account?
pub fn point_in_rotated_rect(p: Point, bounds: AbsCoords, rotation_deg: f32) -> bool {
    if rotation_deg == 0.0 {
        return bounds.contains(p);
    }
    let center = bounds.center();
    let inverse = Affine::translate((center.x as f64, center.y as f64))
        * Affine::rotate(-(rotation_deg as f64).to_radians())
        * Affine::translate((-center.x as f64, -center.y as f64));
    let local = inverse * KPoint::new(p.x as f64, p.y as f64);
    bounds.contains(Point::new(local.x as f32, local.y as f32))
}

/// Topmost visible element at `p`, or `None` for the background.
pub fn hit_test_elements(elements: &[TemplateElement], p: Point) -> Option<ItemId> {
    elements
        .iter()
        .rev()
        .find(|el| el.visible && point_in_rotated_rect(p, el.bounds(), el.rotation))
        .map(|el| el.id)
}

/// Which corner handle of `bounds` (if any) is under `p`. Handles are
/// circular, centered on the unrotated corners.
pub fn hit_test_handles(bounds: AbsCoords, p: Point) -> Option<Handle> {
    let corners = [
        (Handle::Delete, Point::new(bounds.x, bounds.y)),
        (Handle::Rotate, Point::new(bounds.x + bounds.width, bounds.y)),
        (Handle::Move, Point::new(bounds.x, bounds.y + bounds.height)),
        (
            Handle::Resize,
            Point::new(bounds.x + bounds.width, bounds.y + bounds.height),
        ),
    ];
    corners
        .into_iter()
        .find(|(_, corner)| p.distance_to(*corner) <= HANDLE_SIZE / 2.0)
        .map(|(handle, _)| handle)
}

/// Topmost print area under `p`, resolved through the current image
/// transform. Later areas sit on top of earlier ones.
pub fn hit_test_areas(
    areas: &[PrintArea],
    transform: &ImageTransform,
    p: Point,
) -> Option<ItemId> {
    areas
        .iter()
        .rev()
        .find(|area| {
            let bounds = print_area_on_scaled_image(area.geometry.to_relative(), transform);
            point_in_rotated_rect(p, bounds, area.rotation)
        })
        .map(|area| area.id)
}

/// On-canvas bounds of an area under the current transform. Convenience
/// wrapper so editors never bypass the shared placement math.
pub fn area_canvas_bounds(area: &PrintArea, transform: &ImageTransform) -> AbsCoords {
    print_area_on_scaled_image(area.geometry.to_relative(), transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::coords::{RelCoords, STANDARD_CANVAS_SIZE, Size, scale_image_to_canvas};
    use pk_core::model::{
        AreaGeometry, AreaShape, ElementKind, ElementPermissions, ShapeProps, TextProps,
    };
    use pretty_assertions::assert_eq;

    fn element(id: &str, x: f32, y: f32, w: f32, h: f32, rotation: f32) -> TemplateElement {
        TemplateElement {
            id: ItemId::intern(id),
            x,
            y,
            width: w,
            height: h,
            rotation,
            locked: false,
            visible: true,
            printable: true,
            name: None,
            permissions: ElementPermissions::default(),
            kind: ElementKind::Shape(ShapeProps::default()),
        }
    }

    #[test]
    fn last_element_wins_overlaps() {
        let elements = vec![
            element("below", 0.0, 0.0, 100.0, 100.0, 0.0),
            element("above", 50.0, 50.0, 100.0, 100.0, 0.0),
        ];
        assert_eq!(
            hit_test_elements(&elements, Point::new(75.0, 75.0)),
            Some(ItemId::intern("above"))
        );
        assert_eq!(
            hit_test_elements(&elements, Point::new(10.0, 10.0)),
            Some(ItemId::intern("below"))
        );
        assert_eq!(hit_test_elements(&elements, Point::new(300.0, 300.0)), None);
    }

    #[test]
    fn invisible_elements_are_skipped() {
        let mut el = element("hidden", 0.0, 0.0, 100.0, 100.0, 0.0);
        el.visible = false;
        assert_eq!(hit_test_elements(&[el], Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn rotation_moves_the_hit_region() {
        // Wide, thin bar rotated 90°: its corners leave the footprint and
        // points above the center enter it.
        let bar = element("bar", 0.0, 40.0, 100.0, 20.0, 90.0);
        assert_eq!(
            hit_test_elements(std::slice::from_ref(&bar), Point::new(5.0, 45.0)),
            None
        );
        assert_eq!(
            hit_test_elements(std::slice::from_ref(&bar), Point::new(50.0, 5.0)),
            Some(ItemId::intern("bar"))
        );
    }

    #[test]
    fn handles_sit_on_the_four_corners() {
        let bounds = AbsCoords {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 150.0,
        };
        assert_eq!(
            hit_test_handles(bounds, Point::new(102.0, 98.0)),
            Some(Handle::Delete)
        );
        assert_eq!(
            hit_test_handles(bounds, Point::new(300.0, 100.0)),
            Some(Handle::Rotate)
        );
        assert_eq!(
            hit_test_handles(bounds, Point::new(100.0, 250.0)),
            Some(Handle::Move)
        );
        assert_eq!(
            hit_test_handles(bounds, Point::new(298.0, 252.0)),
            Some(Handle::Resize)
        );
        assert_eq!(hit_test_handles(bounds, Point::new(200.0, 175.0)), None);
    }

    #[test]
    fn area_hits_resolve_through_the_transform() {
        let transform = scale_image_to_canvas(Size::new(800.0, 600.0), STANDARD_CANVAS_SIZE);
        let areas = vec![PrintArea {
            id: ItemId::intern("front_area"),
            name: "Área 1".to_owned(),
            shape: AreaShape::Rectangle,
            geometry: AreaGeometry::Relative(RelCoords {
                x: 25.0,
                y: 25.0,
                width: 50.0,
                height: 50.0,
            }),
            rotation: 0.0,
            real_width: None,
            real_height: None,
        }];
        assert_eq!(
            hit_test_areas(&areas, &transform, Point::new(400.0, 300.0)),
            Some(ItemId::intern("front_area"))
        );
        assert_eq!(
            hit_test_areas(&areas, &transform, Point::new(10.0, 10.0)),
            None
        );
    }

    #[test]
    fn text_elements_hit_like_shapes() {
        let el = TemplateElement {
            kind: ElementKind::Text(TextProps::default()),
            ..element("caption", 10.0, 10.0, 120.0, 30.0, 0.0)
        };
        assert_eq!(
            hit_test_elements(std::slice::from_ref(&el), Point::new(60.0, 25.0)),
            Some(ItemId::intern("caption"))
        );
    }
}
