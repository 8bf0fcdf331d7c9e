//! Shape style resolution.
//!
//! Turns a [`ShapeProps`] into a stable stack of paint layers. The literal
//! "transparent" paint means the property is *omitted* (no layer), never
//! painted as an opaque color. Resolution is a pure function of its
//! inputs, so an identical element always yields an identical visual and
//! the host view never has to tear down and rebuild layer subtrees.

use pk_core::model::{Color, ShapeProps, ShapeType};

/// Corner rounding applied to a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerRadius {
    None,
    /// Full rounding, used for circles.
    Half,
    Px(f32),
}

/// A resolved border stroke. `width` is already floored at 1 px and
/// scaled by zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSpec {
    pub color: Color,
    pub width: f32,
}

/// Placement of the raster image inside a fillable shape. Offset and
/// scale are independent of the shape frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImagePlacement {
    pub src: String,
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

/// One paint layer of a resolved shape, back-to-front.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeLayer {
    /// Basic geometric body: optional fill, optional border.
    Body {
        fill: Option<Color>,
        stroke: Option<StrokeSpec>,
        corner_radius: CornerRadius,
    },
    /// Custom silhouette: stroke color painted through the mask image.
    MaskedStroke { mask_src: String, color: Color },
    /// Custom silhouette: fill color painted through the mask image,
    /// inset by the stroke width so the stroke layer reads as a border.
    MaskedFill {
        mask_src: String,
        color: Color,
        inset: f32,
    },
    /// Raster image clipped to the shape, with a camera placeholder when
    /// no image has been chosen yet.
    FillableImage {
        mask_src: Option<String>,
        image: Option<MaskImagePlacement>,
        corner_radius: CornerRadius,
    },
    /// Decorative emoji glyph centered on the shape (star, heart).
    Glyph { glyph: &'static str, font_size: f32 },
}

/// The complete resolved visual for one shape element.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeVisual {
    pub layers: Vec<ShapeLayer>,
}

fn corner_radius(shape_type: ShapeType, zoom: f32) -> CornerRadius {
    match shape_type {
        ShapeType::Circle => CornerRadius::Half,
        ShapeType::Star | ShapeType::Heart => CornerRadius::Px(8.0 * zoom),
        _ => CornerRadius::None,
    }
}

/// Resolve a shape element into paint layers. `height` is the element
/// height in canvas px (drives the glyph size); `zoom` is the current
/// canvas zoom factor.
pub fn resolve(shape: &ShapeProps, height: f32, zoom: f32) -> ShapeVisual {
    let mut layers = Vec::new();

    // A stroke only counts when it is both visible and wider than zero;
    // visible strokes are floored at 1 px.
    let stroke = shape.stroke_color.solid().and_then(|color| {
        (shape.stroke_width > 0.0).then(|| StrokeSpec {
            color,
            width: shape.stroke_width.max(1.0) * zoom,
        })
    });
    let radius = corner_radius(shape.shape_type, zoom);

    match (&shape.shape_type, &shape.shape_src) {
        (ShapeType::Custom, Some(mask_src)) => {
            if let Some(color) = shape.stroke_color.solid() {
                layers.push(ShapeLayer::MaskedStroke {
                    mask_src: mask_src.clone(),
                    color,
                });
            }
            if let Some(color) = shape.fill_color.solid() {
                layers.push(ShapeLayer::MaskedFill {
                    mask_src: mask_src.clone(),
                    color,
                    inset: stroke.map_or(0.0, |s| s.width),
                });
            }
        }
        _ => {
            layers.push(ShapeLayer::Body {
                fill: shape.fill_color.solid(),
                stroke,
                corner_radius: radius,
            });
        }
    }

    match shape.shape_type {
        ShapeType::Star => layers.push(ShapeLayer::Glyph {
            glyph: "⭐",
            font_size: height * 0.3 * zoom,
        }),
        ShapeType::Heart => layers.push(ShapeLayer::Glyph {
            glyph: "❤️",
            font_size: height * 0.4 * zoom,
        }),
        _ => {}
    }

    if shape.use_as_fillable_shape {
        let mask_src = match (&shape.shape_type, &shape.shape_src) {
            (ShapeType::Custom, Some(src)) => Some(src.clone()),
            _ => None,
        };
        let image = shape.mask_image_src.as_ref().map(|src| MaskImagePlacement {
            src: src.clone(),
            offset_x: shape.mask_image_x.unwrap_or(0.0),
            offset_y: shape.mask_image_y.unwrap_or(0.0),
            scale: shape.mask_image_scale.unwrap_or(1.0),
        });
        layers.push(ShapeLayer::FillableImage {
            mask_src,
            image,
            corner_radius: radius,
        });
    }

    ShapeVisual { layers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::model::Paint;
    use pretty_assertions::assert_eq;

    fn shape() -> ShapeProps {
        ShapeProps::default()
    }

    #[test]
    fn default_rectangle_has_fill_and_border() {
        let visual = resolve(&shape(), 100.0, 1.0);
        assert_eq!(visual.layers.len(), 1);
        match &visual.layers[0] {
            ShapeLayer::Body {
                fill,
                stroke,
                corner_radius,
            } => {
                assert_eq!(fill.unwrap().to_hex(), "#ff6b35");
                let stroke = stroke.unwrap();
                assert_eq!(stroke.width, 2.0);
                assert_eq!(stroke.color, Color::BLACK);
                assert_eq!(*corner_radius, CornerRadius::None);
            }
            other => panic!("expected body layer, got {other:?}"),
        }
    }

    #[test]
    fn transparent_paints_omit_their_layers() {
        let mut s = shape();
        s.fill_color = Paint::Transparent;
        s.stroke_color = Paint::Transparent;
        let visual = resolve(&s, 100.0, 1.0);
        match &visual.layers[0] {
            ShapeLayer::Body { fill, stroke, .. } => {
                assert_eq!(*fill, None);
                assert_eq!(*stroke, None);
            }
            other => panic!("expected body layer, got {other:?}"),
        }
    }

    #[test]
    fn zero_width_stroke_is_no_border() {
        let mut s = shape();
        s.stroke_width = 0.0;
        let visual = resolve(&s, 100.0, 1.0);
        match &visual.layers[0] {
            ShapeLayer::Body { stroke, .. } => assert_eq!(*stroke, None),
            other => panic!("expected body layer, got {other:?}"),
        }
    }

    #[test]
    fn thin_strokes_floor_at_one_pixel() {
        let mut s = shape();
        s.stroke_width = 0.25;
        let visual = resolve(&s, 100.0, 1.0);
        match &visual.layers[0] {
            ShapeLayer::Body { stroke, .. } => assert_eq!(stroke.unwrap().width, 1.0),
            other => panic!("expected body layer, got {other:?}"),
        }
    }

    #[test]
    fn custom_shape_builds_masked_layers_with_inset_fill() {
        let mut s = shape();
        s.shape_type = ShapeType::Custom;
        s.shape_src = Some("blob:mask.svg".to_owned());
        s.stroke_width = 3.0;
        let visual = resolve(&s, 100.0, 1.0);
        assert_eq!(visual.layers.len(), 2);
        assert!(matches!(&visual.layers[0], ShapeLayer::MaskedStroke { .. }));
        match &visual.layers[1] {
            ShapeLayer::MaskedFill { inset, .. } => assert_eq!(*inset, 3.0),
            other => panic!("expected masked fill, got {other:?}"),
        }
    }

    #[test]
    fn circle_rounds_fully_and_star_gets_its_glyph() {
        let mut s = shape();
        s.shape_type = ShapeType::Circle;
        let circle = resolve(&s, 100.0, 1.0);
        match &circle.layers[0] {
            ShapeLayer::Body { corner_radius, .. } => {
                assert_eq!(*corner_radius, CornerRadius::Half)
            }
            other => panic!("expected body layer, got {other:?}"),
        }

        s.shape_type = ShapeType::Star;
        let star = resolve(&s, 100.0, 1.0);
        match star.layers.last().unwrap() {
            ShapeLayer::Glyph { glyph, font_size } => {
                assert_eq!(*glyph, "⭐");
                assert_eq!(*font_size, 30.0);
            }
            other => panic!("expected glyph layer, got {other:?}"),
        }
    }

    #[test]
    fn fillable_shape_shows_camera_placeholder_until_image_chosen() {
        let mut s = shape();
        s.use_as_fillable_shape = true;
        let empty = resolve(&s, 100.0, 1.0);
        match empty.layers.last().unwrap() {
            ShapeLayer::FillableImage { image, .. } => assert!(image.is_none()),
            other => panic!("expected fillable layer, got {other:?}"),
        }

        s.mask_image_src = Some("photo.png".to_owned());
        s.mask_image_x = Some(4.0);
        s.mask_image_scale = Some(1.5);
        let with_image = resolve(&s, 100.0, 1.0);
        match with_image.layers.last().unwrap() {
            ShapeLayer::FillableImage { image, .. } => {
                let image = image.as_ref().unwrap();
                assert_eq!(image.offset_x, 4.0);
                assert_eq!(image.offset_y, 0.0);
                assert_eq!(image.scale, 1.5);
            }
            other => panic!("expected fillable layer, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_stable() {
        let s = shape();
        assert_eq!(resolve(&s, 100.0, 1.0), resolve(&s, 100.0, 1.0));
    }
}
