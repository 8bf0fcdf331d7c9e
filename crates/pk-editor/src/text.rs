//! Text measurement and the font catalog.
//!
//! Text elements are sized to their content *at creation time*, so a box
//! never ships with a stale fixed size. Measurement sits behind the
//! [`TextMeasurer`] trait: production uses real font metrics via
//! `ab_glyph`; headless and test contexts use the heuristic measurer,
//! which approximates per-character advances well enough for layout.

use pk_core::coords::Size;
use pk_core::model::FontWeight;
use serde::{Deserialize, Serialize};

/// Minimum width of a measured text box, px.
const MIN_TEXT_WIDTH: f32 = 20.0;
/// Padding added around the measured ink, px.
const TEXT_PADDING: f32 = 2.0;
/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.16;

/// Measures a text block at a given font setting. Implementations must be
/// deterministic: equal inputs, equal output.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f32, font_family: &str, weight: FontWeight) -> Size;
}

/// Shared post-processing: pad the ink box and apply the floor sizes.
fn finish(max_line_width: f32, line_count: usize, font_size: f32) -> Size {
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let total_height = if line_count > 1 {
        (line_count as f32 - 1.0) * line_height + font_size
    } else {
        font_size
    };
    Size::new(
        (max_line_width + TEXT_PADDING).max(MIN_TEXT_WIDTH),
        (total_height + TEXT_PADDING).max(font_size),
    )
}

// ─── Heuristic measurer ──────────────────────────────────────────────────

/// Approximates glyph advances by character class. No font files needed,
/// so this works in tests and on the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

fn advance_factor(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '!' | '\'' | '|' | '.' | ',' | ':' | ';' => 0.30,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' => 0.40,
        'm' | 'w' => 0.85,
        'M' | 'W' | '@' => 0.95,
        ' ' => 0.30,
        c if c.is_ascii_uppercase() => 0.70,
        c if c.is_ascii_digit() => 0.55,
        _ => 0.55,
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, font_size: f32, _font_family: &str, weight: FontWeight) -> Size {
        let weight_factor = match weight {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => 1.06,
        };
        let mut max_width = 0.0f32;
        let mut line_count = 0;
        for line in text.split('\n') {
            line_count += 1;
            let width: f32 = line.chars().map(advance_factor).sum::<f32>() * font_size;
            max_width = max_width.max(width * weight_factor);
        }
        finish(max_width, line_count.max(1), font_size)
    }
}

// ─── Font-metric measurer ────────────────────────────────────────────────

/// Measures with real glyph advances from a loaded font. The host is
/// responsible for picking the right font file for a family/weight pair;
/// one measurer wraps one face.
pub struct FontMetricsMeasurer {
    font: ab_glyph::FontVec,
}

impl FontMetricsMeasurer {
    /// Load a TTF/OTF face from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        let font = ab_glyph::FontVec::try_from_vec(bytes)
            .map_err(|e| format!("invalid font data: {e}"))?;
        Ok(Self { font })
    }
}

impl TextMeasurer for FontMetricsMeasurer {
    fn measure(&self, text: &str, font_size: f32, _font_family: &str, _weight: FontWeight) -> Size {
        use ab_glyph::{Font, ScaleFont};
        let scaled = self.font.as_scaled(ab_glyph::PxScale::from(font_size));

        let mut max_width = 0.0f32;
        let mut line_count = 0;
        for line in text.split('\n') {
            line_count += 1;
            let mut width = 0.0f32;
            let mut prev: Option<ab_glyph::GlyphId> = None;
            for c in line.chars() {
                let glyph = scaled.scaled_glyph(c);
                if let Some(prev) = prev {
                    width += scaled.kern(prev, glyph.id);
                }
                width += scaled.h_advance(glyph.id);
                prev = Some(glyph.id);
            }
            max_width = max_width.max(width);
        }
        finish(max_width, line_count.max(1), font_size)
    }
}

// ─── Font catalog ────────────────────────────────────────────────────────

/// One installable font face as listed by the font service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFace {
    pub id: String,
    pub family: String,
    pub style: String,
    pub weight: String,
    pub is_active: bool,
}

/// The fonts an operator can pick from. Normally fetched from the font
/// service; when that fails the editor falls back to four system fonts
/// instead of an empty picker.
#[derive(Debug, Clone, PartialEq)]
pub struct FontCatalog {
    pub fonts: Vec<FontFace>,
}

impl FontCatalog {
    /// The hardcoded catalog used when the font service is unreachable.
    pub fn fallback() -> Self {
        let face = |id: &str, family: &str| FontFace {
            id: id.to_owned(),
            family: family.to_owned(),
            style: "Regular".to_owned(),
            weight: "400".to_owned(),
            is_active: true,
        };
        Self {
            fonts: vec![
                face("1", "Arial"),
                face("2", "Helvetica"),
                face("3", "Times New Roman"),
                face("4", "Georgia"),
            ],
        }
    }

    /// Parse the font-service response: either a bare array of faces or
    /// an object with a `fonts` array. Anything else yields the fallback.
    pub fn from_service_json(json: &str) -> Self {
        #[derive(Deserialize)]
        struct Wrapped {
            fonts: Vec<FontFace>,
        }
        if let Ok(fonts) = serde_json::from_str::<Vec<FontFace>>(json) {
            return Self { fonts };
        }
        if let Ok(wrapped) = serde_json::from_str::<Wrapped>(json) {
            return Self {
                fonts: wrapped.fonts,
            };
        }
        log::warn!("unparseable font catalog response, using fallback fonts");
        Self::fallback()
    }

    /// Active faces only, for the picker.
    pub fn active(&self) -> impl Iterator<Item = &FontFace> {
        self.fonts.iter().filter(|f| f.is_active)
    }
}
