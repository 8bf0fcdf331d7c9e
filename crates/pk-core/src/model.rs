//! Core data model for PrintKit documents.
//!
//! A product has sides; each side carries a photo, a list of print areas
//! (regions where personalization is allowed), and a list of template
//! elements (text, images, shapes) designed by an operator. Geometry is
//! stored in relative (percentage) coordinates so the same document renders
//! correctly at any canvas size; legacy documents with raw pixel geometry
//! are kept as-is and converted for display only.

use crate::coords::{AbsCoords, Point, RelCoords, Size};
use crate::id::ItemId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut v = [0u8; 4];
                for (i, b) in bytes.iter().enumerate() {
                    v[i] = hex_val(*b)? * 17;
                }
                let a = if bytes.len() == 4 { v[3] } else { 255 };
                Some(Self::rgba(
                    v[0] as f32 / 255.0,
                    v[1] as f32 / 255.0,
                    v[2] as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            6 | 8 => {
                let mut v = [0u8; 4];
                for (i, pair) in bytes.chunks(2).enumerate() {
                    v[i] = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                let a = if bytes.len() == 8 { v[3] } else { 255 };
                Some(Self::rgba(
                    v[0] as f32 / 255.0,
                    v[1] as f32 / 255.0,
                    v[2] as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB` (or `#RRGGBBAA` when not fully opaque), lowercase.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// A fill or stroke color that may be the literal "transparent", meaning
/// the property is omitted entirely when the element is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Transparent,
    Solid(Color),
}

impl Paint {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Paint::Transparent)
    }

    pub fn solid(&self) -> Option<Color> {
        match self {
            Paint::Transparent => None,
            Paint::Solid(c) => Some(*c),
        }
    }
}

impl Serialize for Paint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Paint::Transparent => serializer.serialize_str("transparent"),
            Paint::Solid(c) => serializer.serialize_str(&c.to_hex()),
        }
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Paint::Transparent);
        }
        Color::from_hex(&s)
            .map(Paint::Solid)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

// ─── Print areas ─────────────────────────────────────────────────────────

/// Visual shape of a print area outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaShape {
    #[default]
    Rectangle,
    Circle,
    Ellipse,
    Polygon,
}

/// Where an area's numbers live. New areas are always `Relative`
/// (percentages of the original side photo); documents written before the
/// relative-coordinate migration carry raw pixels against a recorded
/// reference canvas and are converted for display only, never rewritten
/// in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaGeometry {
    Relative(RelCoords),
    Legacy { coords: AbsCoords, reference: Size },
}

impl AreaGeometry {
    /// Resolve to percentages of the original image, converting legacy
    /// pixel geometry through its recorded reference size.
    pub fn to_relative(&self) -> RelCoords {
        match *self {
            AreaGeometry::Relative(rel) => rel,
            AreaGeometry::Legacy { coords, reference } => {
                crate::coords::absolute_to_relative(coords, reference)
            }
        }
    }
}

/// A region of a product side where personalization is allowed.
/// Serializes through the flat [`crate::document::AreaDoc`] wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "crate::document::AreaDoc", from = "crate::document::AreaDoc")]
pub struct PrintArea {
    pub id: ItemId,
    pub name: String,
    pub shape: AreaShape,
    pub geometry: AreaGeometry,
    /// Degrees, normalized to [0, 360).
    pub rotation: f32,
    /// Physical size in cm, present once the side is calibrated.
    pub real_width: Option<f32>,
    pub real_height: Option<f32>,
}

impl PrintArea {
    /// Normalize a rotation into [0, 360).
    pub fn normalize_rotation(deg: f32) -> f32 {
        let r = deg % 360.0;
        if r < 0.0 { r + 360.0 } else { r }
    }

    pub fn set_rotation(&mut self, deg: f32) {
        self.rotation = Self::normalize_rotation(deg);
    }
}

/// One calibration line drawn over the side photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementLine {
    pub start: Point,
    pub end: Point,
    /// Physical length in cm as entered by the operator.
    pub real_distance: f32,
}

/// Persisted calibration state for one product side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels_per_cm: Option<f32>,
    #[serde(default)]
    pub measurement_lines: Vec<MeasurementLine>,
    #[serde(default)]
    pub has_valid_measurement: bool,
}

// ─── Product sides ───────────────────────────────────────────────────────

/// One face of the product (front, back, sleeve...). Sides come from the
/// product catalog; the editors never create or delete them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSide {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// URL of the side photo.
    #[serde(rename = "image2D", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub print_areas: SmallVec<[PrintArea; 4]>,
}

// ─── Template elements ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Star,
    Heart,
    /// Uploaded silhouette rendered through an image mask (`shape_src`).
    Custom,
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Customer-facing editing permissions every element carries. Admin-side
/// editing ignores these; the customer editor enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPermissions {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_move: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_rotate: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_resize: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_delete: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub always_on_top: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub always_on_bottom: bool,
}

impl Default for ElementPermissions {
    fn default() -> Self {
        Self {
            can_move: true,
            can_rotate: true,
            can_resize: true,
            can_delete: true,
            always_on_top: false,
            always_on_bottom: false,
        }
    }
}

/// Text-specific customer permissions and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPermissions {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_edit_text: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_font_family: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_font_color: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_font_style: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_font_alignment: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_use_curved_text: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_resize_text_box: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mandatory_to_edit: bool,
}

impl Default for TextPermissions {
    fn default() -> Self {
        Self {
            can_edit_text: true,
            can_change_font_family: true,
            can_change_font_color: true,
            can_change_font_style: true,
            can_change_font_alignment: true,
            can_use_curved_text: false,
            can_resize_text_box: true,
            mandatory_to_edit: false,
        }
    }
}

/// Image-specific customer permissions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePermissions {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_replace_image: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_add_mask: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_replace_mask: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_remove_mask: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_edit_mask: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_edit_mask_stroke_width: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_edit_mask_stroke_color: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_edit_masked_image: bool,
}

impl Default for ImagePermissions {
    fn default() -> Self {
        Self {
            can_replace_image: true,
            can_add_mask: false,
            can_replace_mask: false,
            can_remove_mask: false,
            can_edit_mask: false,
            can_edit_mask_stroke_width: false,
            can_edit_mask_stroke_color: false,
            can_edit_masked_image: false,
        }
    }
}

/// Shape-specific customer permissions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePermissions {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_stroke_width: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_change_stroke_color: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_move_rotate_resize_stretch: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_move_rotate_resize_masked_image: bool,
}

impl Default for ShapePermissions {
    fn default() -> Self {
        Self {
            can_change_stroke_width: true,
            can_change_stroke_color: true,
            can_move_rotate_resize_stretch: true,
            can_move_rotate_resize_masked_image: true,
        }
    }
}

/// Text element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub text_decoration: TextDecoration,
    /// Fill color of the glyphs (hex).
    pub color: Paint,
    #[serde(default, skip_serializing_if = "is_false")]
    pub curved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_line_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_uppercase: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub include_in_thumbnail: bool,
    #[serde(flatten)]
    pub permissions: TextPermissions,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 24.0,
            font_family: "Arial".to_owned(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            text_align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
            text_decoration: TextDecoration::default(),
            color: Paint::Solid(Color::BLACK),
            curved: false,
            curve_radius: None,
            letter_spacing: None,
            line_spacing: None,
            min_font_size: None,
            max_font_size: None,
            min_letter_spacing: None,
            max_letter_spacing: None,
            min_line_spacing: None,
            max_line_spacing: None,
            auto_uppercase: false,
            include_in_thumbnail: true,
            permissions: TextPermissions::default(),
        }
    }
}

/// Image element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub maintain_aspect_ratio: bool,
    #[serde(flatten)]
    pub permissions: ImagePermissions,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: None,
            maintain_aspect_ratio: true,
            permissions: ImagePermissions::default(),
        }
    }
}

/// Shape element payload. `mask_image_*` position a raster image inside a
/// fillable shape independently of the shape frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    pub shape_type: ShapeType,
    pub fill_color: Paint,
    pub stroke_color: Paint,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub use_as_fillable_shape: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image_scale: Option<f32>,
    /// Last opaque values, restored when the operator toggles a paint
    /// back from transparent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fill_color: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stroke_color: Option<Paint>,
    #[serde(flatten)]
    pub permissions: ShapePermissions,
}

/// Default shape paints: orange fill, black stroke, 2 px.
impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            shape_type: ShapeType::Rectangle,
            fill_color: Paint::Solid(Color::from_hex("#ff6b35").unwrap_or(Color::BLACK)),
            stroke_color: Paint::Solid(Color::BLACK),
            stroke_width: 2.0,
            use_as_fillable_shape: false,
            shape_src: None,
            mask_image_src: None,
            mask_image_x: None,
            mask_image_y: None,
            mask_image_scale: None,
            last_fill_color: None,
            last_stroke_color: None,
            permissions: ShapePermissions::default(),
        }
    }
}

/// Per-kind element payload, tagged on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
}

impl ElementKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
        }
    }
}

/// One design element on a product side. Geometry is in canvas pixels
/// while editing; the document layer converts to/from relative coordinates
/// at the save/load boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateElement {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub printable: bool,
    /// Operator-facing display name shown in the layer list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub permissions: ElementPermissions,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl TemplateElement {
    pub fn bounds(&self) -> AbsCoords {
        AbsCoords {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Pin the element above everything else. Clears `always_on_bottom`;
    /// the two flags are mutually exclusive.
    pub fn set_always_on_top(&mut self, on: bool) {
        self.permissions.always_on_top = on;
        if on {
            self.permissions.always_on_bottom = false;
        }
    }

    /// Pin the element below everything else. Clears `always_on_top`.
    pub fn set_always_on_bottom(&mut self, on: bool) {
        self.permissions.always_on_bottom = on;
        if on {
            self.permissions.always_on_top = false;
        }
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeProps> {
        match &self.kind {
            ElementKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeProps> {
        match &mut self.kind {
            ElementKind::Shape(s) => Some(s),
            _ => None,
        }
    }
}
