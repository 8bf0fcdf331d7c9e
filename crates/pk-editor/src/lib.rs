//! Editor state machines for PrintKit.
//!
//! Two editors share this crate: the print-area editor (calibrate a side
//! photo, draw the printable regions) and the template editor (design the
//! default elements a product ships with). Both are pure state machines:
//! pointer and keyboard events in, model mutations out, no rendering and
//! no I/O. Persistence happens through the sink traits so hosts decide
//! how documents actually travel.

pub mod area;
pub mod gesture;
pub mod history;
pub mod input;
pub mod shortcuts;
pub mod template;
pub mod text;

pub use area::{
    AreaEditor, AreaEvent, AreaRenameSink, AreaSaveSink, AreaTool, Notice, STANDARD_SIZES,
};
pub use gesture::{DragMode, DragSession};
pub use history::{HISTORY_CAP, History};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use template::{TemplateEditor, TemplateSaveSink, TemplateTool};
pub use text::{FontCatalog, FontFace, FontMetricsMeasurer, HeuristicMeasurer, TextMeasurer};
