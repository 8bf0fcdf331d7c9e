//! Print-area editor state machine.
//!
//! Drives the admin screen where an operator calibrates a product photo
//! and draws the regions a customer may print into. The editor owns the
//! area list for one side; rendering and persistence stay outside, behind
//! the save/rename sinks.
//!
//! All stored geometry is relative (percentages of the scaled side photo).
//! Pointer positions arrive in canvas px and are converted at the edges.

use crate::gesture::{DragMode, DragSession};
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use pk_core::calibration::Calibration;
use pk_core::coords::{
    AbsCoords, ImageTransform, Point, RelCoords, Size, canvas_to_image_coords,
    print_area_on_scaled_image, scale_image_to_canvas,
};
use pk_core::id::ItemId;
use pk_core::model::{AreaGeometry, AreaShape, MeasurementData, PrintArea};
use pk_render::hit::{Handle, hit_test_areas, hit_test_handles};

/// Tolerance for snapping an area center to the canvas center lines, px.
const SNAP_TOLERANCE: f32 = 15.0;
/// Margin kept between a standard-size area and the canvas edge, px.
const FIT_MARGIN: f32 = 40.0;
/// Smallest area dimension during interactive resize, percent.
const MIN_AREA_PERCENT: f32 = 5.0;

/// ISO A-series print sizes, cm.
pub const STANDARD_SIZES: [(&str, f32, f32); 4] = [
    ("A2", 42.0, 59.4),
    ("A3", 29.7, 42.0),
    ("A4", 21.0, 29.7),
    ("A5", 14.8, 21.0),
];

/// The three tools of the area editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaTool {
    /// Draw the calibration line.
    Measure,
    /// Draw a new print area (two clicks).
    Area,
    /// Select and transform existing areas.
    Select,
}

/// Conditions the host UI surfaces as a transient notice.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Recalibration updated the physical size of N areas.
    AreasRecalculated(usize),
    /// A standard size did not fit and was displayed scaled down.
    AreaRescaledToFit { percent: f32 },
    /// A save or rename collaborator failed.
    SaveFailed(String),
}

/// Something the pointer interaction asks the host to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaEvent {
    /// A new area was drawn and auto-selected.
    AreaCreated(ItemId),
    /// The delete handle was pressed; the host confirms before calling
    /// [`AreaEditor::delete_area`].
    DeleteRequested(ItemId),
    /// Selection changed (possibly to nothing).
    SelectionChanged(Option<ItemId>),
}

/// Persists the full area list plus measurement data.
pub trait AreaSaveSink {
    fn save(&mut self, areas: &[PrintArea], measurement: &MeasurementData) -> Result<(), String>;
}

/// Updates a single area's name (the per-area PATCH endpoint).
pub trait AreaRenameSink {
    fn rename(&mut self, id: ItemId, name: &str) -> Result<(), String>;
}

/// Snapshot of the grabbed area at drag start.
#[derive(Debug, Clone, Copy)]
struct AreaSnapshot {
    rel: RelCoords,
}

/// Editor state for one product side.
pub struct AreaEditor {
    mode: AreaTool,
    shape: AreaShape,
    areas: Vec<PrintArea>,
    selected: Option<ItemId>,
    calibration: Calibration,
    transform: ImageTransform,
    canvas: Size,
    /// First click of a two-click area draw.
    draw_start: Option<Point>,
    drag: Option<DragSession<AreaSnapshot>>,
    drag_moved: bool,
    /// Name applied to the next drawn area; empty means auto-number.
    pending_name: String,
    proportional_lock: bool,
    proportional_ratio: Option<f32>,
    is_saving: bool,
}

impl AreaEditor {
    /// Open the editor for a side photo of `image` natural size shown on
    /// a `canvas`-sized surface, resuming any persisted state. Starts in
    /// Select when a prior calibration exists, otherwise in Measure.
    pub fn new(
        image: Size,
        canvas: Size,
        existing_areas: Vec<PrintArea>,
        existing_measurement: Option<MeasurementData>,
    ) -> Self {
        let calibration = Calibration::from_data(existing_measurement);
        let mode = if calibration.is_calibrated() {
            AreaTool::Select
        } else {
            AreaTool::Measure
        };
        Self {
            mode,
            shape: AreaShape::Rectangle,
            areas: existing_areas,
            selected: None,
            calibration,
            transform: scale_image_to_canvas(image, canvas),
            canvas,
            draw_start: None,
            drag: None,
            drag_moved: false,
            pending_name: String::new(),
            proportional_lock: false,
            proportional_ratio: None,
            is_saving: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn mode(&self) -> AreaTool {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AreaTool) {
        self.mode = mode;
        self.draw_start = None;
        self.drag = None;
    }

    pub fn set_shape(&mut self, shape: AreaShape) {
        self.shape = shape;
    }

    pub fn areas(&self) -> &[PrintArea] {
        &self.areas
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// On-canvas bounds of an area under the current transform.
    pub fn area_bounds(&self, id: ItemId) -> Option<AbsCoords> {
        self.area(id)
            .map(|a| print_area_on_scaled_image(a.geometry.to_relative(), &self.transform))
    }

    fn area(&self, id: ItemId) -> Option<&PrintArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    fn area_mut(&mut self, id: ItemId) -> Option<&mut PrintArea> {
        self.areas.iter_mut().find(|a| a.id == id)
    }

    /// Name for the next drawn area; empty reverts to auto-numbering.
    pub fn set_pending_name(&mut self, name: &str) {
        self.pending_name = name.trim().to_owned();
    }

    fn next_area_name(&self) -> String {
        if self.pending_name.is_empty() {
            format!("Área {}", self.areas.len() + 1)
        } else {
            self.pending_name.clone()
        }
    }

    // ─── Pointer interaction ────────────────────────────────────────────

    /// Route a normalized input event from the host view.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<AreaEvent> {
        match event {
            InputEvent::PointerDown { pos, .. } => self.pointer_down(*pos),
            InputEvent::PointerMove { pos, .. } => {
                self.pointer_move(*pos);
                None
            }
            InputEvent::PointerUp { pos } => {
                self.pointer_up(*pos);
                None
            }
            InputEvent::Key { key, modifiers } => {
                match ShortcutMap::resolve(key, *modifiers) {
                    Some(ShortcutAction::Cancel) => {
                        self.cancel();
                        None
                    }
                    // Deletion is confirmable, same as the handle.
                    Some(ShortcutAction::Delete) => {
                        self.selected.map(AreaEvent::DeleteRequested)
                    }
                    _ => None,
                }
            }
        }
    }

    pub fn pointer_down(&mut self, p: Point) -> Option<AreaEvent> {
        match self.mode {
            AreaTool::Measure => {
                self.calibration.click(p);
                None
            }
            AreaTool::Area => self.area_draw_click(p),
            AreaTool::Select => self.select_pointer_down(p),
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        if self.mode == AreaTool::Select
            && let Some(session) = self.drag
        {
            let (dx, dy) = session.delta(p);
            if dx != 0.0 || dy != 0.0 {
                self.drag_moved = true;
            }
            self.apply_transform(session, p);
        }
    }

    pub fn pointer_up(&mut self, _p: Point) {
        if let Some(session) = self.drag.take() {
            // A press on the rotate handle with no drag is the
            // fixed-increment rotation.
            if session.mode == DragMode::Rotate && !self.drag_moved {
                self.rotate_selected(45.0);
            }
        }
        self.drag_moved = false;
    }

    /// Escape: abort whatever is half-done without touching the areas.
    pub fn cancel(&mut self) {
        self.draw_start = None;
        self.drag = None;
        self.drag_moved = false;
        self.calibration.cancel();
    }

    fn area_draw_click(&mut self, p: Point) -> Option<AreaEvent> {
        let Some(start) = self.draw_start else {
            self.draw_start = Some(p);
            return None;
        };
        self.draw_start = None;

        let bbox = AbsCoords {
            x: start.x.min(p.x),
            y: start.y.min(p.y),
            width: (p.x - start.x).abs(),
            height: (p.y - start.y).abs(),
        };
        let rel = canvas_to_image_coords(bbox, &self.transform);
        if rel.width <= 0.0 || rel.height <= 0.0 {
            log::debug!("ignoring degenerate area draw");
            return None;
        }

        let (real_width, real_height) = self.real_size_of(rel);
        let area = PrintArea {
            id: ItemId::with_prefix("area"),
            name: self.next_area_name(),
            shape: self.shape,
            geometry: AreaGeometry::Relative(rel),
            rotation: 0.0,
            real_width,
            real_height,
        };
        let id = area.id;
        self.areas.push(area);
        self.mode = AreaTool::Select;
        self.selected = Some(id);
        self.adopt_ratio_from(id);
        Some(AreaEvent::AreaCreated(id))
    }

    fn select_pointer_down(&mut self, p: Point) -> Option<AreaEvent> {
        // Handles of the current selection take priority over body hits.
        if let Some(id) = self.selected
            && let Some(bounds) = self.area_bounds(id)
            && let Some(handle) = hit_test_handles(bounds, p)
        {
            let snapshot = AreaSnapshot {
                rel: self.area(id)?.geometry.to_relative(),
            };
            self.drag_moved = false;
            match handle {
                Handle::Delete => return Some(AreaEvent::DeleteRequested(id)),
                Handle::Rotate => {
                    self.drag = Some(DragSession::new(DragMode::Rotate, p, snapshot));
                }
                Handle::Move => {
                    self.drag = Some(DragSession::new(DragMode::Move, p, snapshot));
                }
                Handle::Resize => {
                    self.drag = Some(DragSession::new(DragMode::Resize, p, snapshot));
                }
            }
            return None;
        }

        // Body hit: select (and allow dragging the body to move).
        let hit = hit_test_areas(&self.areas, &self.transform, p);
        if let Some(id) = hit {
            let snapshot = AreaSnapshot {
                rel: self.area(id)?.geometry.to_relative(),
            };
            self.drag = Some(DragSession::new(DragMode::Move, p, snapshot));
            self.drag_moved = false;
        }
        if hit != self.selected {
            self.selected = hit;
            if let Some(id) = hit {
                self.adopt_ratio_from(id);
            }
            return Some(AreaEvent::SelectionChanged(hit));
        }
        None
    }

    fn apply_transform(&mut self, session: DragSession<AreaSnapshot>, p: Point) {
        let Some(id) = self.selected else { return };
        let initial = session.initial.rel;
        let (dx, dy) = session.delta(p);
        let transform = self.transform;
        let canvas = self.canvas;
        let ppcm = self.calibration.pixels_per_cm();

        let Some(area) = self.area_mut(id) else {
            return;
        };
        match session.mode {
            DragMode::Move => {
                let rel_dx = (dx / transform.width) * 100.0;
                let rel_dy = (dy / transform.height) * 100.0;
                let mut x = (initial.x + rel_dx).clamp(0.0, 100.0 - initial.width);
                let mut y = (initial.y + rel_dy).clamp(0.0, 100.0 - initial.height);

                // Snap the area center to the canvas center lines.
                let moved = RelCoords { x, y, ..initial };
                let on_canvas = print_area_on_scaled_image(moved, &transform);
                let center = on_canvas.center();
                if (center.x - canvas.width / 2.0).abs() < SNAP_TOLERANCE {
                    let target = canvas.width / 2.0 - on_canvas.width / 2.0;
                    x = ((target - transform.left) / transform.width) * 100.0;
                }
                if (center.y - canvas.height / 2.0).abs() < SNAP_TOLERANCE {
                    let target = canvas.height / 2.0 - on_canvas.height / 2.0;
                    y = ((target - transform.top) / transform.height) * 100.0;
                }
                area.geometry = AreaGeometry::Relative(RelCoords {
                    x: x.clamp(0.0, 100.0 - initial.width),
                    y: y.clamp(0.0, 100.0 - initial.height),
                    ..initial
                });
            }
            DragMode::Resize => {
                let rel_dx = (dx / transform.width) * 100.0;
                let rel_dy = (dy / transform.height) * 100.0;
                let width = (initial.width + rel_dx)
                    .max(MIN_AREA_PERCENT)
                    .min(100.0 - initial.x);
                let height = (initial.height + rel_dy)
                    .max(MIN_AREA_PERCENT)
                    .min(100.0 - initial.y);
                area.geometry = AreaGeometry::Relative(RelCoords {
                    width,
                    height,
                    ..initial
                });
                if let Some(ppcm) = ppcm {
                    area.real_width = Some((width / 100.0) * transform.width / ppcm);
                    area.real_height = Some((height / 100.0) * transform.height / ppcm);
                }
            }
            DragMode::Rotate => {
                let center = Point::new(
                    initial.x + initial.width / 2.0,
                    initial.y + initial.height / 2.0,
                );
                let rel_p = Point::new(
                    ((p.x - transform.left) / transform.width) * 100.0,
                    ((p.y - transform.top) / transform.height) * 100.0,
                );
                let degrees = (rel_p.y - center.y)
                    .atan2(rel_p.x - center.x)
                    .to_degrees()
                    .round();
                area.set_rotation(degrees);
            }
        }
    }

    /// Live preview rectangle while drawing an area (two-click draw).
    pub fn draw_preview(&self, cursor: Point) -> Option<AbsCoords> {
        let start = self.draw_start?;
        Some(AbsCoords {
            x: start.x.min(cursor.x),
            y: start.y.min(cursor.y),
            width: (cursor.x - start.x).abs(),
            height: (cursor.y - start.y).abs(),
        })
    }

    // ─── Calibration ────────────────────────────────────────────────────

    /// Confirm the pending measurement with the typed distance. On
    /// success switches to the area tool so the operator can draw next.
    pub fn confirm_measurement(&mut self, input: &str) -> Option<Notice> {
        let count = self
            .calibration
            .confirm(input, &mut self.areas, &self.transform)?;
        self.mode = AreaTool::Area;
        self.shape = AreaShape::Rectangle;
        (count > 0).then_some(Notice::AreasRecalculated(count))
    }

    fn real_size_of(&self, rel: RelCoords) -> (Option<f32>, Option<f32>) {
        match self.calibration.pixels_per_cm() {
            Some(ppcm) => (
                Some((rel.width / 100.0) * self.transform.width / ppcm),
                Some((rel.height / 100.0) * self.transform.height / ppcm),
            ),
            None => (None, None),
        }
    }

    // ─── Area operations ────────────────────────────────────────────────

    pub fn delete_area(&mut self, id: ItemId) {
        self.areas.retain(|a| a.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// Rotate the selection by a fixed increment (the rotate-handle click).
    pub fn rotate_selected(&mut self, degrees: f32) {
        let Some(id) = self.selected else { return };
        if let Some(area) = self.area_mut(id) {
            let rotation = area.rotation;
            area.set_rotation(rotation + degrees);
        }
    }

    /// Move the selection so its center sits on the image center, clamped
    /// to bounds.
    pub fn center_selected(&mut self) {
        let Some(id) = self.selected else { return };
        if let Some(area) = self.area_mut(id) {
            let rel = area.geometry.to_relative();
            area.geometry = AreaGeometry::Relative(RelCoords {
                x: (50.0 - rel.width / 2.0).clamp(0.0, 100.0 - rel.width),
                y: (50.0 - rel.height / 2.0).clamp(0.0, 100.0 - rel.height),
                ..rel
            });
        }
    }

    /// Resize the selection to a named standard print size. The nominal
    /// cm values are kept even when the on-screen rectangle has to be
    /// scaled down to fit the canvas; only the display shrinks.
    pub fn apply_standard_size(&mut self, name: &str) -> Option<Notice> {
        let (_, width_cm, height_cm) = STANDARD_SIZES
            .iter()
            .copied()
            .find(|(n, _, _)| *n == name)?;
        let notice = self.apply_size_cm(width_cm, height_cm, true)?;
        self.proportional_ratio = Some(width_cm / height_cm);
        Some(notice)
    }

    /// Resize the selection to operator-typed cm dimensions.
    pub fn apply_manual_size(&mut self, width_cm: f32, height_cm: f32) -> Option<Notice> {
        if width_cm <= 0.0 || height_cm <= 0.0 {
            log::warn!("rejected manual size {width_cm}x{height_cm}");
            return None;
        }
        self.apply_size_cm(width_cm, height_cm, false)
    }

    fn apply_size_cm(&mut self, width_cm: f32, height_cm: f32, fit: bool) -> Option<Notice> {
        let id = self.selected?;
        let ppcm = self.calibration.pixels_per_cm()?;

        let mut width_px = width_cm * ppcm;
        let mut height_px = height_cm * ppcm;
        let mut scale = 1.0;
        if fit {
            (width_px, height_px, scale) = scale_to_fit(width_px, height_px, self.canvas);
        }

        let transform = self.transform;
        let area = self.area_mut(id)?;
        let rel = area.geometry.to_relative();
        let width = ((width_px / transform.width) * 100.0).min(100.0 - rel.x);
        let height = ((height_px / transform.height) * 100.0).min(100.0 - rel.y);
        area.geometry = AreaGeometry::Relative(RelCoords {
            width,
            height,
            ..rel
        });
        area.real_width = Some(width_cm);
        area.real_height = Some(height_cm);

        if scale < 1.0 {
            Some(Notice::AreaRescaledToFit {
                percent: scale * 100.0,
            })
        } else {
            None
        }
    }

    /// Create a new area centered on the image from typed cm dimensions.
    pub fn create_centered_area(&mut self, width_cm: f32, height_cm: f32) -> Option<ItemId> {
        let ppcm = self.calibration.pixels_per_cm()?;
        if width_cm <= 0.0 || height_cm <= 0.0 {
            log::warn!("rejected centered area size {width_cm}x{height_cm}");
            return None;
        }
        let width = (width_cm * ppcm / self.transform.width) * 100.0;
        let height = (height_cm * ppcm / self.transform.height) * 100.0;
        let x = (50.0 - width / 2.0).clamp(0.0, (100.0 - width).max(0.0));
        let y = (50.0 - height / 2.0).clamp(0.0, (100.0 - height).max(0.0));

        let area = PrintArea {
            id: ItemId::with_prefix("area"),
            name: self.next_area_name(),
            shape: self.shape,
            geometry: AreaGeometry::Relative(pk_core::coords::clamp_rel(RelCoords {
                x,
                y,
                width,
                height,
            })),
            rotation: 0.0,
            real_width: Some(width_cm),
            real_height: Some(height_cm),
        };
        let id = area.id;
        self.areas.push(area);
        self.selected = Some(id);
        self.mode = AreaTool::Select;
        Some(id)
    }

    // ─── Proportional lock ──────────────────────────────────────────────

    pub fn set_proportional_lock(&mut self, locked: bool) {
        self.proportional_lock = locked;
    }

    fn adopt_ratio_from(&mut self, id: ItemId) {
        if let Some(area) = self.area(id)
            && let (Some(w), Some(h)) = (area.real_width, area.real_height)
            && h > 0.0
        {
            self.proportional_ratio = Some(w / h);
        }
    }

    /// Height completing a typed width under the proportional lock.
    pub fn proportional_height_for(&self, width_cm: f32) -> Option<f32> {
        let ratio = self.locked_ratio()?;
        (width_cm > 0.0).then(|| width_cm / ratio)
    }

    /// Width completing a typed height under the proportional lock.
    pub fn proportional_width_for(&self, height_cm: f32) -> Option<f32> {
        let ratio = self.locked_ratio()?;
        (height_cm > 0.0).then(|| height_cm * ratio)
    }

    fn locked_ratio(&self) -> Option<f32> {
        if !self.proportional_lock {
            return None;
        }
        self.proportional_ratio.filter(|r| *r > 0.0)
    }

    // ─── Persistence ────────────────────────────────────────────────────

    /// Rename the selected area through the per-area collaborator. Local
    /// state only changes when the collaborator succeeds.
    pub fn rename_selected(
        &mut self,
        name: &str,
        sink: &mut dyn AreaRenameSink,
    ) -> Option<Notice> {
        let id = self.selected?;
        let name = name.trim();
        if name.is_empty() || self.is_saving {
            return None;
        }
        self.is_saving = true;
        let result = sink.rename(id, name);
        self.is_saving = false;
        match result {
            Ok(()) => {
                if let Some(area) = self.area_mut(id) {
                    area.name = name.to_owned();
                }
                None
            }
            Err(e) => {
                log::error!("area rename failed: {e}");
                Some(Notice::SaveFailed(e))
            }
        }
    }

    /// Save the whole configuration (areas + measurement data). Reentrant
    /// calls while a save is in flight are dropped.
    pub fn save(&mut self, sink: &mut dyn AreaSaveSink) -> Option<Notice> {
        if self.is_saving {
            log::warn!("save ignored, another save is in flight");
            return None;
        }
        self.is_saving = true;
        let result = sink.save(&self.areas, self.calibration.data());
        self.is_saving = false;
        match result {
            Ok(()) => None,
            Err(e) => {
                log::error!("area save failed: {e}");
                Some(Notice::SaveFailed(e))
            }
        }
    }
}

/// Uniformly scale a pixel rectangle down until it fits the canvas minus
/// the margin. Returns (width, height, applied scale ≤ 1).
fn scale_to_fit(width_px: f32, height_px: f32, canvas: Size) -> (f32, f32, f32) {
    let max_width = canvas.width - FIT_MARGIN * 2.0;
    let max_height = canvas.height - FIT_MARGIN * 2.0;
    if width_px <= max_width && height_px <= max_height {
        return (width_px, height_px, 1.0);
    }
    let scale = (max_width / width_px).min(max_height / height_px);
    (width_px * scale, height_px * scale, scale)
}
