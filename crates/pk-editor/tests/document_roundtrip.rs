//! Full persistence cycles: area editor save payloads and template
//! documents surviving a JSON roundtrip, including legacy documents.

use pk_core::coords::{Point, RelCoords, STANDARD_CANVAS_SIZE, Size};
use pk_core::document::TemplateDocument;
use pk_core::id::ItemId;
use pk_core::model::{
    AreaGeometry, AreaShape, MeasurementData, PrintArea, ProductSide, ShapeType,
};
use pk_editor::area::{AreaEditor, AreaEvent, AreaSaveSink, AreaTool};
use pk_editor::text::HeuristicMeasurer;
use pk_editor::TemplateEditor;
use smallvec::smallvec;

struct CapturingSink {
    areas: Vec<PrintArea>,
    measurement: Option<MeasurementData>,
}

impl AreaSaveSink for CapturingSink {
    fn save(&mut self, areas: &[PrintArea], measurement: &MeasurementData) -> Result<(), String> {
        self.areas = areas.to_vec();
        self.measurement = Some(measurement.clone());
        Ok(())
    }
}

#[test]
fn calibrate_draw_resize_save_carries_everything() {
    let mut editor = AreaEditor::new(
        Size::new(800.0, 600.0),
        STANDARD_CANVAS_SIZE,
        Vec::new(),
        None,
    );

    // Calibrate: a 150 px line over a 15 cm feature.
    editor.pointer_down(Point::new(100.0, 100.0));
    editor.pointer_down(Point::new(250.0, 100.0));
    editor.confirm_measurement("15");
    assert_eq!(editor.calibration().pixels_per_cm(), Some(10.0));
    assert_eq!(editor.mode(), AreaTool::Area);

    // Draw an area and give it the A4 size.
    editor.pointer_down(Point::new(200.0, 100.0));
    let created = editor.pointer_down(Point::new(400.0, 250.0));
    assert!(matches!(created, Some(AreaEvent::AreaCreated(_))));
    editor.apply_standard_size("A4");

    let mut sink = CapturingSink {
        areas: Vec::new(),
        measurement: None,
    };
    assert_eq!(editor.save(&mut sink), None);

    assert_eq!(sink.areas.len(), 1);
    assert_eq!(sink.areas[0].real_width, Some(21.0));
    assert_eq!(sink.areas[0].real_height, Some(29.7));
    let measurement = sink.measurement.expect("measurement data saved");
    assert_eq!(measurement.pixels_per_cm, Some(10.0));
    assert!(measurement.has_valid_measurement);
    assert_eq!(measurement.measurement_lines.len(), 1);

    // The persisted wire form carries the relative flag and reference.
    let json = serde_json::to_value(&sink.areas[0]).expect("serializes");
    assert_eq!(json["isRelativeCoordinates"], true);
    assert_eq!(json["referenceWidth"], 800.0);
    let back: PrintArea = serde_json::from_value(json).expect("deserializes");
    assert_eq!(back, sink.areas[0]);
}

fn product_side(id: &str) -> ProductSide {
    ProductSide {
        id: ItemId::intern(id),
        name: id.to_owned(),
        display_name: None,
        image_url: Some(format!("https://cdn/{id}.png")),
        print_areas: smallvec![PrintArea {
            id: ItemId::with_prefix("area"),
            name: "Área 1".to_owned(),
            shape: AreaShape::Rectangle,
            geometry: AreaGeometry::Relative(RelCoords {
                x: 20.0,
                y: 20.0,
                width: 60.0,
                height: 50.0,
            }),
            rotation: 0.0,
            real_width: None,
            real_height: None,
        }],
    }
}

fn template_editor() -> TemplateEditor {
    let front = product_side("tshirt_front");
    let back = product_side("tshirt_back");
    let current = front.id;
    TemplateEditor::new(vec![front, back], current, STANDARD_CANVAS_SIZE)
}

#[test]
fn template_survives_a_json_roundtrip() {
    let mut editor = template_editor();
    let back = ItemId::intern("tshirt_back");

    let text = editor.add_text(&HeuristicMeasurer);
    editor.set_text(text, "Feliz cumpleaños", &HeuristicMeasurer);
    editor.change_side(back);
    editor.add_shape(ShapeType::Star);
    editor.change_side(ItemId::intern("tshirt_front"));

    let original = editor.elements().to_vec();
    let doc = editor.to_document("Cumpleaños");
    let json = serde_json::to_string(&doc).expect("document serializes");
    let parsed: TemplateDocument = serde_json::from_str(&json).expect("document parses");
    assert_eq!(parsed, doc);
    assert_eq!(parsed.product_sides.len(), 2);
    assert!(parsed.allow_text_edit);

    let mut fresh = template_editor();
    fresh.load_document(parsed, &HeuristicMeasurer);
    assert_eq!(fresh.current_side(), ItemId::intern("tshirt_front"));
    assert_eq!(fresh.elements().len(), 1);
    let restored = &fresh.elements()[0];
    assert!((restored.x - original[0].x).abs() < 1e-2);
    assert!((restored.width - original[0].width).abs() < 1e-2);
    assert_eq!(restored.as_text().unwrap().text, "Feliz cumpleaños");
    assert_eq!(fresh.side_elements(back).unwrap().len(), 1);
}

#[test]
fn legacy_documents_load_with_pixel_geometry_intact() {
    // A document written before the relative-coordinate migration: no
    // relative flags, raw pixel geometry, and the old fixed text box.
    let json = serde_json::json!({
        "name": "Plantilla vieja",
        "currentSide": "tshirt_front",
        "sideElements": {
            "tshirt_front": [{
                "id": "text_legacy",
                "x": 150.0, "y": 90.0, "width": 120.0, "height": 30.0,
                "type": "text",
                "text": "Hola",
                "fontSize": 16.0,
                "fontFamily": "Arial",
                "color": "#000000"
            }]
        },
        "canvasSize": { "width": 800.0, "height": 600.0 }
    });
    let doc: TemplateDocument = serde_json::from_value(json).expect("legacy parses");

    let mut editor = template_editor();
    editor.load_document(doc, &HeuristicMeasurer);
    let el = &editor.elements()[0];
    // Pixel position passes through unscaled.
    assert_eq!(el.x, 150.0);
    assert_eq!(el.y, 90.0);
    // The stale fixed box is re-measured from its content.
    assert_ne!((el.width, el.height), (120.0, 30.0));
}
