//! Wire documents: the JSON shapes areas and templates are persisted in.
//!
//! Persistence always writes relative (percentage) coordinates tagged with
//! the reference canvas size they were captured against. Loading converts
//! relative-tagged values back to pixels for the current canvas; documents
//! written before the relative-coordinate migration are passed through
//! unchanged, with a standard 800×600 reference assumed for areas that
//! never recorded one.

use crate::coords::{
    AbsCoords, RelCoords, STANDARD_CANVAS_SIZE, Size, absolute_to_relative, relative_to_absolute,
};
use crate::id::ItemId;
use crate::model::{AreaGeometry, AreaShape, PrintArea, ProductSide, TemplateElement};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Print-area documents ────────────────────────────────────────────────

/// Flat persisted form of a [`PrintArea`]. The in-memory tagged geometry
/// is folded into x/y/width/height plus the `isRelativeCoordinates`
/// marker and the reference size the numbers are percentages of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDoc {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub shape: AreaShape,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_height: Option<f32>,
    #[serde(default)]
    pub is_relative_coordinates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_height: Option<f32>,
}

impl From<PrintArea> for AreaDoc {
    fn from(area: PrintArea) -> Self {
        let (coords, is_relative, reference) = match area.geometry {
            AreaGeometry::Relative(rel) => (
                AbsCoords {
                    x: rel.x,
                    y: rel.y,
                    width: rel.width,
                    height: rel.height,
                },
                true,
                STANDARD_CANVAS_SIZE,
            ),
            AreaGeometry::Legacy { coords, reference } => (coords, false, reference),
        };
        AreaDoc {
            id: area.id,
            name: area.name,
            shape: area.shape,
            x: coords.x,
            y: coords.y,
            width: coords.width,
            height: coords.height,
            rotation: area.rotation,
            real_width: area.real_width,
            real_height: area.real_height,
            is_relative_coordinates: is_relative,
            reference_width: Some(reference.width),
            reference_height: Some(reference.height),
        }
    }
}

impl From<AreaDoc> for PrintArea {
    fn from(doc: AreaDoc) -> Self {
        let geometry = if doc.is_relative_coordinates {
            AreaGeometry::Relative(RelCoords {
                x: doc.x,
                y: doc.y,
                width: doc.width,
                height: doc.height,
            })
        } else {
            AreaGeometry::Legacy {
                coords: AbsCoords {
                    x: doc.x,
                    y: doc.y,
                    width: doc.width,
                    height: doc.height,
                },
                reference: Size::new(
                    doc.reference_width.unwrap_or(STANDARD_CANVAS_SIZE.width),
                    doc.reference_height.unwrap_or(STANDARD_CANVAS_SIZE.height),
                ),
            }
        };
        PrintArea {
            id: doc.id,
            name: doc.name,
            shape: doc.shape,
            geometry,
            rotation: PrintArea::normalize_rotation(doc.rotation),
            real_width: doc.real_width,
            real_height: doc.real_height,
        }
    }
}

// ─── Template documents ──────────────────────────────────────────────────

/// Persisted form of one template element: the element itself plus the
/// relative-coordinate marker and the canvas size the percentages refer
/// to. Legacy elements have the marker unset and pixel geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDoc {
    #[serde(flatten)]
    pub element: TemplateElement,
    #[serde(default)]
    pub is_relative_coordinates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_canvas_size: Option<Size>,
}

/// Convert editor elements (canvas pixels) into persisted relative form.
pub fn elements_to_relative(elements: &[TemplateElement], canvas: Size) -> Vec<ElementDoc> {
    elements
        .iter()
        .map(|el| {
            let rel = absolute_to_relative(el.bounds(), canvas);
            let mut element = el.clone();
            element.x = rel.x;
            element.y = rel.y;
            element.width = rel.width;
            element.height = rel.height;
            ElementDoc {
                element,
                is_relative_coordinates: true,
                reference_canvas_size: Some(canvas),
            }
        })
        .collect()
}

/// Convert persisted elements back to canvas pixels. Relative-tagged
/// elements are resolved against the target canvas; legacy elements pass
/// through with their pixel geometry untouched.
pub fn elements_to_absolute(docs: Vec<ElementDoc>, target: Size) -> Vec<TemplateElement> {
    docs.into_iter()
        .map(|doc| {
            let mut el = doc.element;
            if doc.is_relative_coordinates {
                let abs = relative_to_absolute(
                    RelCoords {
                        x: el.x,
                        y: el.y,
                        width: el.width,
                        height: el.height,
                    },
                    target,
                );
                el.x = abs.x;
                el.y = abs.y;
                el.width = abs.width;
                el.height = abs.height;
            } else {
                log::debug!("passing through legacy element {} unchanged", el.id);
            }
            el
        })
        .collect()
}

/// Catalog entry of a product side as embedded in a template document
/// (the print areas themselves live with the product, not the template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSummary {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "image2D", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&ProductSide> for SideSummary {
    fn from(side: &ProductSide) -> Self {
        SideSummary {
            id: side.id,
            name: side.name.clone(),
            display_name: side.display_name.clone(),
            image_url: side.image_url.clone(),
        }
    }
}

/// The full persisted template: per-side element lists in relative
/// coordinates plus the metadata the storefront needs to decide what a
/// customer may edit. `restrictions` and `template_settings` are opaque
/// UI configuration carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub current_side: ItemId,
    pub side_elements: HashMap<ItemId, Vec<ElementDoc>>,
    #[serde(default)]
    pub product_sides: Vec<SideSummary>,
    /// Reference size the relative coordinates were captured against.
    pub canvas_size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_settings: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub allow_text_edit: bool,
    #[serde(default)]
    pub allow_image_edit: bool,
    #[serde(default)]
    pub allow_color_edit: bool,
    /// Ids of unlocked elements across all sides.
    #[serde(default)]
    pub editable_areas: Vec<ItemId>,
}
