pub mod calibration;
pub mod coords;
pub mod document;
pub mod id;
pub mod model;

pub use calibration::{Calibration, CalibrationState};
pub use coords::{
    AbsCoords, ImageTransform, Point, RelCoords, STANDARD_CANVAS_SIZE, Size,
    print_area_on_scaled_image, scale_image_to_canvas,
};
pub use document::{AreaDoc, ElementDoc, TemplateDocument};
pub use id::ItemId;
pub use model::*;
