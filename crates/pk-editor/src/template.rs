//! Template editor state machine.
//!
//! Drives the admin screen where an operator designs what a product ships
//! with: text, images, and shapes laid out inside the print areas, per
//! side. The editor owns the element lists for every side, a bounded
//! undo/redo history for the side being edited, and the zoom level.
//! Geometry is kept in canvas pixels while editing; the document layer
//! converts to relative coordinates at the save/load boundary.

use crate::area::Notice;
use crate::gesture::{DragMode, DragSession};
use crate::history::History;
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::text::TextMeasurer;
use pk_core::coords::{AbsCoords, Point, Size, print_area_on_scaled_image, scale_image_to_canvas};
use pk_core::document::{TemplateDocument, elements_to_absolute, elements_to_relative};
use pk_core::id::ItemId;
use pk_core::model::{
    ElementKind, ElementPermissions, ImageProps, Paint, ProductSide, ShapeProps, ShapeType,
    TemplateElement, TextAlign, TextProps,
};
use pk_render::hit::{Handle, hit_test_elements, hit_test_handles};
use std::collections::HashMap;

/// Tolerance for snapping an element center to the canvas center lines, px.
const SNAP_TOLERANCE: f32 = 10.0;
/// Offset applied to a duplicated element, px.
const DUPLICATE_OFFSET: f32 = 20.0;
/// Smallest element dimension during interactive resize, px.
const MIN_ELEMENT_PX: f32 = 20.0;

const ZOOM_MIN: f32 = 0.25;
const ZOOM_MAX: f32 = 3.0;
const ZOOM_STEP: f32 = 0.25;

/// Aspect ratio assumed for the side photo when anchoring new elements
/// inside a print area. Matches the product mockups the catalog ships.
const ASSUMED_IMAGE_SIZE: Size = Size {
    width: 600.0,
    height: 780.0,
};

/// The four tools of the template editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateTool {
    #[default]
    Select,
    Text,
    Image,
    Shape,
}

/// Persists a serialized template.
pub trait TemplateSaveSink {
    fn save(&mut self, doc: &TemplateDocument) -> Result<(), String>;
}

/// Editor state for a whole template (all sides of one product).
pub struct TemplateEditor {
    tool: TemplateTool,
    canvas: Size,
    zoom: f32,
    /// Elements of the side being edited, front-to-back is last-to-first.
    elements: Vec<TemplateElement>,
    /// Stashed element lists for the sides not being edited.
    side_elements: HashMap<ItemId, Vec<TemplateElement>>,
    product_sides: Vec<ProductSide>,
    current_side: ItemId,
    selected: Option<ItemId>,
    history: History<Vec<TemplateElement>>,
    drag: Option<DragSession<AbsCoords>>,
    drag_moved: bool,
    /// When on, newly created elements are cloned onto every other side.
    sync_all_sides: bool,
    /// Paints reused for the next new shape.
    last_fill: Paint,
    last_stroke: Paint,
    is_saving: bool,
}

impl TemplateEditor {
    pub fn new(product_sides: Vec<ProductSide>, current_side: ItemId, canvas: Size) -> Self {
        Self {
            tool: TemplateTool::Select,
            canvas,
            zoom: 1.0,
            elements: Vec::new(),
            side_elements: HashMap::new(),
            product_sides,
            current_side,
            selected: None,
            history: History::new(Vec::new()),
            drag: None,
            drag_moved: false,
            sync_all_sides: false,
            last_fill: ShapeProps::default().fill_color,
            last_stroke: ShapeProps::default().stroke_color,
            is_saving: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn tool(&self) -> TemplateTool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: TemplateTool) {
        self.tool = tool;
    }

    pub fn elements(&self) -> &[TemplateElement] {
        &self.elements
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ItemId>) {
        self.selected = id;
    }

    pub fn current_side(&self) -> ItemId {
        self.current_side
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn set_sync_all_sides(&mut self, on: bool) {
        self.sync_all_sides = on;
    }

    fn element(&self, id: ItemId) -> Option<&TemplateElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ItemId) -> Option<&mut TemplateElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn commit(&mut self) {
        self.history.push(self.elements.clone());
    }

    // ─── Element creation ────────────────────────────────────────────────

    /// Canvas-pixel bounds of the first print area of the current side,
    /// used to anchor new elements where they will actually print.
    fn first_area_bounds(&self) -> Option<AbsCoords> {
        let side = self.product_sides.iter().find(|s| s.id == self.current_side)?;
        let area = side.print_areas.first()?;
        let transform = scale_image_to_canvas(ASSUMED_IMAGE_SIZE, self.canvas);
        Some(print_area_on_scaled_image(
            area.geometry.to_relative(),
            &transform,
        ))
    }

    /// Add a sample text element, sized to its content, anchored a tenth
    /// of the way into the first print area.
    pub fn add_text(&mut self, measurer: &dyn TextMeasurer) -> ItemId {
        let props = TextProps {
            text: "Texto de ejemplo".to_owned(),
            font_size: 16.0,
            text_align: TextAlign::Left,
            curve_radius: Some(50.0),
            ..TextProps::default()
        };
        let size = measurer.measure(
            &props.text,
            props.font_size,
            &props.font_family,
            props.font_weight,
        );
        let (x, y) = match self.first_area_bounds() {
            Some(area) => (area.x + area.width * 0.1, area.y + area.height * 0.1),
            None => (100.0, 100.0),
        };
        self.insert_element(ItemId::with_prefix("text"), x, y, size, ElementKind::Text(props))
    }

    /// Add an image element, square, half the smaller area dimension but
    /// never larger than 200 px, centered in the first print area.
    pub fn add_image(&mut self, src: Option<String>) -> ItemId {
        let (x, y, side_len) = match self.first_area_bounds() {
            Some(area) => {
                let side_len = 200.0_f32.min(area.width.min(area.height) * 0.5);
                (
                    area.x + (area.width - side_len) / 2.0,
                    area.y + (area.height - side_len) / 2.0,
                    side_len,
                )
            }
            None => (50.0, 50.0, 200.0),
        };
        let props = ImageProps {
            src,
            ..ImageProps::default()
        };
        self.insert_element(
            ItemId::with_prefix("image"),
            x,
            y,
            Size::new(side_len, side_len),
            ElementKind::Image(props),
        )
    }

    /// Add a 100×100 shape, reusing the paints of the last edited shape.
    pub fn add_shape(&mut self, shape_type: ShapeType) -> ItemId {
        let size = Size::new(100.0, 100.0);
        let (x, y) = match self.first_area_bounds() {
            Some(area) => (
                area.x + (area.width - size.width) / 2.0,
                area.y + (area.height - size.height) / 2.0,
            ),
            None => (100.0, 100.0),
        };
        let props = ShapeProps {
            shape_type,
            fill_color: self.last_fill,
            stroke_color: self.last_stroke,
            ..ShapeProps::default()
        };
        self.insert_element(
            ItemId::with_prefix("shape"),
            x,
            y,
            size,
            ElementKind::Shape(props),
        )
    }

    fn insert_element(
        &mut self,
        id: ItemId,
        x: f32,
        y: f32,
        size: Size,
        kind: ElementKind,
    ) -> ItemId {
        let element = TemplateElement {
            id,
            x,
            y,
            width: size.width,
            height: size.height,
            rotation: 0.0,
            locked: false,
            visible: true,
            printable: true,
            name: None,
            permissions: ElementPermissions::default(),
            kind,
        };
        if self.sync_all_sides {
            self.clone_to_other_sides(&element);
        }
        self.elements.push(element);
        self.selected = Some(id);
        self.tool = TemplateTool::Select;
        self.commit();
        id
    }

    /// Stamp a copy of the element onto every other side, each copy under
    /// a side-derived id so later edits stay independent.
    fn clone_to_other_sides(&mut self, element: &TemplateElement) {
        for side in &self.product_sides {
            if side.id == self.current_side {
                continue;
            }
            let mut clone = element.clone();
            clone.id = element.id.derived_for_side(side.id);
            self.side_elements.entry(side.id).or_default().push(clone);
        }
    }

    // ─── Element operations ──────────────────────────────────────────────

    pub fn duplicate(&mut self, id: ItemId) -> Option<ItemId> {
        let source = self.element(id)?.clone();
        let mut copy = source;
        copy.id = ItemId::with_prefix(copy.kind.kind_name());
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        let new_id = copy.id;
        self.elements.push(copy);
        self.selected = Some(new_id);
        self.commit();
        Some(new_id)
    }

    pub fn delete(&mut self, id: ItemId) {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() == before {
            return;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
    }

    /// Remove every element on the current side.
    pub fn clear_all(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        self.elements.clear();
        self.selected = None;
        self.commit();
    }

    /// Apply an arbitrary mutation to one element and record it.
    pub fn update_element(&mut self, id: ItemId, f: impl FnOnce(&mut TemplateElement)) {
        if let Some(el) = self.element_mut(id) {
            f(el);
            self.commit();
        }
    }

    /// Replace a text element's content and re-measure its box.
    pub fn set_text(&mut self, id: ItemId, text: &str, measurer: &dyn TextMeasurer) {
        let Some(el) = self.element_mut(id) else { return };
        let Some(props) = el.as_text_mut() else { return };
        props.text = text.to_owned();
        let size = measurer.measure(
            &props.text,
            props.font_size,
            &props.font_family,
            props.font_weight,
        );
        el.width = size.width;
        el.height = size.height;
        self.commit();
    }

    /// Change a shape's fill, remembering the paint for the next shape.
    /// Switching to transparent stashes the old paint so the operator can
    /// toggle back.
    pub fn set_fill(&mut self, id: ItemId, paint: Paint) {
        if !paint.is_transparent() {
            self.last_fill = paint;
        }
        let Some(el) = self.element_mut(id) else { return };
        let Some(shape) = el.as_shape_mut() else { return };
        if paint.is_transparent() && !shape.fill_color.is_transparent() {
            shape.last_fill_color = Some(shape.fill_color);
        }
        shape.fill_color = paint;
        self.commit();
    }

    pub fn set_stroke(&mut self, id: ItemId, paint: Paint) {
        if !paint.is_transparent() {
            self.last_stroke = paint;
        }
        let Some(el) = self.element_mut(id) else { return };
        let Some(shape) = el.as_shape_mut() else { return };
        if paint.is_transparent() && !shape.stroke_color.is_transparent() {
            shape.last_stroke_color = Some(shape.stroke_color);
        }
        shape.stroke_color = paint;
        self.commit();
    }

    /// Restore the fill stashed when it was last set transparent.
    pub fn restore_fill(&mut self, id: ItemId) {
        let Some(el) = self.element_mut(id) else { return };
        let Some(shape) = el.as_shape_mut() else { return };
        if let Some(last) = shape.last_fill_color.take() {
            shape.fill_color = last;
            self.commit();
        }
    }

    pub fn toggle_locked(&mut self, id: ItemId) {
        self.update_element(id, |el| el.locked = !el.locked);
    }

    pub fn toggle_visible(&mut self, id: ItemId) {
        self.update_element(id, |el| el.visible = !el.visible);
    }

    pub fn toggle_printable(&mut self, id: ItemId) {
        self.update_element(id, |el| el.printable = !el.printable);
    }

    // ─── Stacking order ──────────────────────────────────────────────────

    /// One step toward the front (later in the list paints on top).
    pub fn move_forward(&mut self, id: ItemId) {
        let Some(i) = self.index_of(id) else { return };
        if i + 1 >= self.elements.len() {
            return;
        }
        let el = self.elements.remove(i);
        self.elements.insert(i + 1, el);
        self.commit();
    }

    /// One step toward the back.
    pub fn move_backward(&mut self, id: ItemId) {
        let Some(i) = self.index_of(id) else { return };
        if i == 0 {
            return;
        }
        let el = self.elements.remove(i);
        self.elements.insert(i - 1, el);
        self.commit();
    }

    /// Move an element to an explicit stack position (layer-list drag).
    pub fn reorder(&mut self, id: ItemId, index: usize) {
        let Some(i) = self.index_of(id) else { return };
        let el = self.elements.remove(i);
        let index = index.min(self.elements.len());
        self.elements.insert(index, el);
        self.commit();
    }

    pub fn set_always_on_top(&mut self, id: ItemId, on: bool) {
        self.update_element(id, |el| el.set_always_on_top(on));
    }

    pub fn set_always_on_bottom(&mut self, id: ItemId, on: bool) {
        self.update_element(id, |el| el.set_always_on_bottom(on));
    }

    // ─── Pointer interaction ────────────────────────────────────────────

    pub fn pointer_down(&mut self, p: Point) {
        // Handles of the current selection win over body hits.
        if let Some(id) = self.selected
            && let Some(el) = self.element(id)
            && !el.locked
            && let Some(handle) = hit_test_handles(el.bounds(), p)
        {
            let initial = el.bounds();
            self.drag_moved = false;
            match handle {
                Handle::Delete => {
                    self.delete(id);
                }
                Handle::Rotate => {
                    self.drag = Some(DragSession::new(DragMode::Rotate, p, initial));
                }
                Handle::Move => {
                    self.drag = Some(DragSession::new(DragMode::Move, p, initial));
                }
                Handle::Resize => {
                    self.drag = Some(DragSession::new(DragMode::Resize, p, initial));
                }
            }
            return;
        }

        let hit = hit_test_elements(&self.elements, p);
        self.selected = hit;
        if let Some(id) = hit
            && let Some(el) = self.element(id)
            && !el.locked
        {
            self.drag = Some(DragSession::new(DragMode::Move, p, el.bounds()));
            self.drag_moved = false;
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        let Some(session) = self.drag else { return };
        let (dx, dy) = session.delta(p);
        if dx != 0.0 || dy != 0.0 {
            self.drag_moved = true;
        }
        let Some(id) = self.selected else { return };
        let canvas = self.canvas;
        let initial = session.initial;
        let Some(el) = self.element_mut(id) else { return };

        match session.mode {
            DragMode::Move => {
                // Elements may hang halfway off the left/top edge but the
                // center must stay on canvas.
                let mut x = (initial.x + dx)
                    .clamp(-initial.width / 2.0, canvas.width - initial.width / 2.0);
                let mut y = (initial.y + dy)
                    .clamp(-initial.height / 2.0, canvas.height - initial.height / 2.0);
                let center_x = x + initial.width / 2.0;
                let center_y = y + initial.height / 2.0;
                if (center_x - canvas.width / 2.0).abs() < SNAP_TOLERANCE {
                    x = canvas.width / 2.0 - initial.width / 2.0;
                }
                if (center_y - canvas.height / 2.0).abs() < SNAP_TOLERANCE {
                    y = canvas.height / 2.0 - initial.height / 2.0;
                }
                el.x = x;
                el.y = y;
            }
            DragMode::Resize => {
                let maintain = matches!(&el.kind, ElementKind::Image(i) if i.maintain_aspect_ratio);
                let mut width = (initial.width + dx).max(MIN_ELEMENT_PX);
                let mut height = (initial.height + dy).max(MIN_ELEMENT_PX);
                if maintain && initial.height > 0.0 {
                    let ratio = initial.width / initial.height;
                    if width / ratio >= height {
                        height = width / ratio;
                    } else {
                        width = height * ratio;
                    }
                }
                el.width = width;
                el.height = height;
            }
            DragMode::Rotate => {
                let center = initial.center();
                let degrees = (p.y - center.y).atan2(p.x - center.x).to_degrees().round();
                el.rotation = ((degrees % 360.0) + 360.0) % 360.0;
            }
        }
    }

    pub fn pointer_up(&mut self, _p: Point) {
        if self.drag.take().is_some() && self.drag_moved {
            self.commit();
        }
        self.drag_moved = false;
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) {
        if let Some(state) = self.history.undo() {
            self.elements = state;
            self.prune_selection();
        }
    }

    pub fn redo(&mut self) {
        if let Some(state) = self.history.redo() {
            self.elements = state;
            self.prune_selection();
        }
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected
            && self.element(id).is_none()
        {
            self.selected = None;
        }
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }

    // ─── Sides ───────────────────────────────────────────────────────────

    /// Switch the side being edited. The current side's elements are
    /// stashed first, so nothing is lost however often the operator flips
    /// back and forth. History restarts on the new side.
    pub fn change_side(&mut self, side: ItemId) {
        if side == self.current_side {
            return;
        }
        if !self.product_sides.iter().any(|s| s.id == side) {
            log::warn!("ignoring switch to unknown side {side}");
            return;
        }
        let stashed = std::mem::take(&mut self.elements);
        self.side_elements.insert(self.current_side, stashed);
        self.elements = self.side_elements.remove(&side).unwrap_or_default();
        self.current_side = side;
        self.selected = None;
        self.drag = None;
        self.history = History::new(self.elements.clone());
    }

    /// Elements stashed for a side not being edited.
    pub fn side_elements(&self, side: ItemId) -> Option<&[TemplateElement]> {
        if side == self.current_side {
            return Some(&self.elements);
        }
        self.side_elements.get(&side).map(Vec::as_slice)
    }

    // ─── Input routing ───────────────────────────────────────────────────

    /// Route a normalized input event from the host view.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { pos, .. } => self.pointer_down(*pos),
            InputEvent::PointerMove { pos, .. } => self.pointer_move(*pos),
            InputEvent::PointerUp { pos } => self.pointer_up(*pos),
            InputEvent::Key { key, modifiers } => {
                if let Some(action) = ShortcutMap::resolve(key, *modifiers) {
                    self.apply_shortcut(action);
                }
            }
        }
    }

    pub fn apply_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::ToolSelect => self.tool = TemplateTool::Select,
            ShortcutAction::ToolText => self.tool = TemplateTool::Text,
            ShortcutAction::ToolImage => self.tool = TemplateTool::Image,
            ShortcutAction::ToolShape => self.tool = TemplateTool::Shape,
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Duplicate => {
                if let Some(id) = self.selected {
                    self.duplicate(id);
                }
            }
            ShortcutAction::Delete => {
                if let Some(id) = self.selected {
                    self.delete(id);
                }
            }
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.zoom_reset(),
            ShortcutAction::Cancel => {
                self.selected = None;
                self.drag = None;
                self.tool = TemplateTool::Select;
            }
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Serialize the whole template (all sides) in relative coordinates.
    pub fn to_document(&mut self, name: &str) -> TemplateDocument {
        // Fold the live side in with the stashed ones.
        self.side_elements
            .insert(self.current_side, self.elements.clone());

        let mut side_elements = HashMap::new();
        let mut editable_areas = Vec::new();
        let mut allow_text_edit = false;
        let mut allow_image_edit = false;
        let mut allow_color_edit = false;
        for (side, elements) in &self.side_elements {
            for el in elements {
                if !el.locked {
                    editable_areas.push(el.id);
                }
                match &el.kind {
                    ElementKind::Text(t) => {
                        allow_text_edit |= t.permissions.can_edit_text && !el.locked;
                        allow_color_edit |= t.permissions.can_change_font_color && !el.locked;
                    }
                    ElementKind::Image(i) => {
                        allow_image_edit |= i.permissions.can_replace_image && !el.locked;
                    }
                    ElementKind::Shape(_) => {}
                }
            }
            side_elements.insert(*side, elements_to_relative(elements, self.canvas));
        }

        TemplateDocument {
            name: name.to_owned(),
            category: None,
            product_id: None,
            current_side: self.current_side,
            side_elements,
            product_sides: self.product_sides.iter().map(Into::into).collect(),
            canvas_size: self.canvas,
            restrictions: None,
            template_settings: None,
            thumbnail_url: None,
            allow_text_edit,
            allow_image_edit,
            allow_color_edit,
            editable_areas,
        }
    }

    /// Load a persisted template. Legacy text elements saved before boxes
    /// were content-sized come back at a fixed 120×30 and are re-measured.
    pub fn load_document(&mut self, doc: TemplateDocument, measurer: &dyn TextMeasurer) {
        self.current_side = doc.current_side;
        self.side_elements.clear();
        for (side, docs) in doc.side_elements {
            let mut elements = elements_to_absolute(docs, self.canvas);
            for el in &mut elements {
                remeasure_legacy_text(el, measurer);
            }
            self.side_elements.insert(side, elements);
        }
        self.elements = self
            .side_elements
            .remove(&self.current_side)
            .unwrap_or_default();
        self.selected = None;
        self.history = History::new(self.elements.clone());
    }

    /// Save through the collaborator. Reentrant calls while a save is in
    /// flight are dropped.
    pub fn save(&mut self, name: &str, sink: &mut dyn TemplateSaveSink) -> Option<Notice> {
        if self.is_saving {
            log::warn!("template save ignored, another save is in flight");
            return None;
        }
        self.is_saving = true;
        let doc = self.to_document(name);
        let result = sink.save(&doc);
        self.is_saving = false;
        match result {
            Ok(()) => None,
            Err(e) => {
                log::error!("template save failed: {e}");
                Some(Notice::SaveFailed(e))
            }
        }
    }
}

/// Texts written by pre-content-sizing versions carry the old fixed
/// 120×30 box. Size them to their content on load.
fn remeasure_legacy_text(el: &mut TemplateElement, measurer: &dyn TextMeasurer) {
    if el.width != 120.0 || el.height != 30.0 {
        return;
    }
    let Some(t) = el.as_text() else { return };
    let size = measurer.measure(&t.text, t.font_size, &t.font_family, t.font_weight);
    el.width = size.width;
    el.height = size.height;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::HeuristicMeasurer;
    use pk_core::coords::{RelCoords, STANDARD_CANVAS_SIZE};
    use pk_core::model::{AreaGeometry, AreaShape, Color, PrintArea};
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn side(id: &str) -> ProductSide {
        ProductSide {
            id: ItemId::intern(id),
            name: id.to_owned(),
            display_name: None,
            image_url: None,
            print_areas: smallvec![PrintArea {
                id: ItemId::with_prefix("area"),
                name: "Área 1".to_owned(),
                shape: AreaShape::Rectangle,
                geometry: AreaGeometry::Relative(RelCoords {
                    x: 20.0,
                    y: 20.0,
                    width: 60.0,
                    height: 40.0,
                }),
                rotation: 0.0,
                real_width: None,
                real_height: None,
            }],
        }
    }

    fn editor() -> TemplateEditor {
        let front = side("front");
        let back = side("back");
        let current = front.id;
        TemplateEditor::new(vec![front, back], current, STANDARD_CANVAS_SIZE)
    }

    #[test]
    fn text_is_measured_at_creation_and_anchored_in_the_area() {
        let mut e = editor();
        let id = e.add_text(&HeuristicMeasurer);
        assert_eq!(e.tool(), TemplateTool::Select);
        assert_eq!(e.selected(), Some(id));

        let el = &e.elements()[0];
        let t = el.as_text().unwrap();
        assert_eq!(t.text, "Texto de ejemplo");
        assert_eq!(t.font_size, 16.0);
        assert_eq!(t.text_align, TextAlign::Left);
        // Box sized to content, not a fixed default.
        assert_ne!((el.width, el.height), (120.0, 30.0));
        assert!(el.width >= 20.0);
        // Anchored inside the first print area, not at the fallback.
        assert_ne!((el.x, el.y), (100.0, 100.0));
    }

    #[test]
    fn image_defaults_to_half_the_area_capped_at_200() {
        let mut e = editor();
        e.add_image(Some("https://cdn/logo.png".to_owned()));
        let el = &e.elements()[0];
        // Area is 60% x 40% of a 600x780 photo fitted into 800x600.
        assert!(el.width <= 200.0);
        assert_eq!(el.width, el.height);
    }

    #[test]
    fn new_shapes_reuse_the_last_picked_paints() {
        let mut e = editor();
        let first = e.add_shape(ShapeType::Rectangle);
        let red = Paint::Solid(Color::from_hex("#ff0000").unwrap());
        e.set_fill(first, red);
        let second = e.add_shape(ShapeType::Star);
        let shape = e.element(second).unwrap().as_shape().unwrap();
        assert_eq!(shape.fill_color, red);
        assert_eq!(shape.shape_type, ShapeType::Star);
    }

    #[test]
    fn transparent_fill_stashes_and_restores_the_old_paint() {
        let mut e = editor();
        let id = e.add_shape(ShapeType::Circle);
        let orange = e.element(id).unwrap().as_shape().unwrap().fill_color;
        e.set_fill(id, Paint::Transparent);
        assert!(e.element(id).unwrap().as_shape().unwrap().fill_color.is_transparent());
        e.restore_fill(id);
        assert_eq!(e.element(id).unwrap().as_shape().unwrap().fill_color, orange);
    }

    #[test]
    fn duplicate_offsets_and_renames() {
        let mut e = editor();
        let id = e.add_shape(ShapeType::Rectangle);
        let copy = e.duplicate(id).unwrap();
        assert_ne!(copy, id);
        let (a, b) = (e.element(id).unwrap(), e.element(copy).unwrap());
        assert_eq!(b.x, a.x + 20.0);
        assert_eq!(b.y, a.y + 20.0);
        assert_eq!(e.selected(), Some(copy));
    }

    #[test]
    fn stacking_order_moves_one_step_at_a_time() {
        let mut e = editor();
        let a = e.add_shape(ShapeType::Rectangle);
        let b = e.add_shape(ShapeType::Circle);
        let c = e.add_shape(ShapeType::Star);
        assert_eq!(e.index_of(a), Some(0));
        e.move_forward(a);
        assert_eq!(e.index_of(a), Some(1));
        e.move_backward(c);
        assert_eq!(e.index_of(c), Some(1));
        e.reorder(b, 0);
        assert_eq!(e.index_of(b), Some(0));
        // Already at the front: no-op.
        e.move_forward(a);
        e.move_forward(a);
        assert_eq!(e.index_of(a), Some(2));
    }

    #[test]
    fn undo_redo_restore_whole_element_lists() {
        let mut e = editor();
        let a = e.add_shape(ShapeType::Rectangle);
        e.add_shape(ShapeType::Circle);
        e.delete(a);
        assert_eq!(e.elements().len(), 1);
        e.undo();
        assert_eq!(e.elements().len(), 2);
        e.undo();
        assert_eq!(e.elements().len(), 1);
        e.redo();
        e.redo();
        assert_eq!(e.elements().len(), 1);
        assert!(!e.can_redo());
    }

    #[test]
    fn undo_drops_a_stale_selection() {
        let mut e = editor();
        e.add_shape(ShapeType::Rectangle);
        let b = e.add_shape(ShapeType::Circle);
        assert_eq!(e.selected(), Some(b));
        e.undo();
        assert_eq!(e.selected(), None);
    }

    #[test]
    fn move_drag_snaps_to_canvas_center() {
        let mut e = editor();
        let id = e.add_shape(ShapeType::Rectangle);
        e.update_element(id, |el| {
            el.x = 300.0;
            el.y = 200.0;
        });
        // Drag so the center lands a few px off the canvas center.
        e.pointer_down(Point::new(350.0, 250.0));
        e.pointer_move(Point::new(406.0, 304.0));
        e.pointer_up(Point::new(406.0, 304.0));
        let el = e.element(id).unwrap();
        assert_eq!(el.center().x, 400.0);
        assert_eq!(el.center().y, 300.0);
    }

    #[test]
    fn locked_elements_cannot_be_dragged() {
        let mut e = editor();
        let id = e.add_shape(ShapeType::Rectangle);
        e.update_element(id, |el| {
            el.x = 300.0;
            el.y = 200.0;
        });
        e.toggle_locked(id);
        e.pointer_down(Point::new(350.0, 250.0));
        e.pointer_move(Point::new(500.0, 250.0));
        e.pointer_up(Point::new(500.0, 250.0));
        let el = e.element(id).unwrap();
        assert_eq!(el.x, 300.0);
    }

    #[test]
    fn resize_keeps_image_aspect_ratio() {
        let mut e = editor();
        let id = e.add_image(None);
        e.update_element(id, |el| {
            el.x = 100.0;
            el.y = 100.0;
            el.width = 200.0;
            el.height = 100.0;
        });
        // Bottom-right handle at (300, 200); widen by 100.
        e.pointer_down(Point::new(300.0, 200.0));
        e.pointer_move(Point::new(400.0, 200.0));
        e.pointer_up(Point::new(400.0, 200.0));
        let el = e.element(id).unwrap();
        assert_eq!(el.width, 300.0);
        assert_eq!(el.height, 150.0);
    }

    #[test]
    fn side_switch_stashes_and_restores_elements() {
        let mut e = editor();
        let back = ItemId::intern("back");
        let front = e.current_side();
        let a = e.add_text(&HeuristicMeasurer);
        e.change_side(back);
        assert!(e.elements().is_empty());
        assert_eq!(e.side_elements(front).unwrap().len(), 1);
        e.add_shape(ShapeType::Heart);
        e.change_side(front);
        assert_eq!(e.elements()[0].id, a);
        assert_eq!(e.side_elements(back).unwrap().len(), 1);
    }

    #[test]
    fn sync_clones_new_elements_to_every_side() {
        let mut e = editor();
        let back = ItemId::intern("back");
        e.set_sync_all_sides(true);
        let id = e.add_shape(ShapeType::Rectangle);
        let clones = e.side_elements(back).unwrap();
        assert_eq!(clones.len(), 1);
        assert_eq!(clones[0].id, id.derived_for_side(back));
        assert_eq!(clones[0].width, 100.0);
    }

    #[test]
    fn document_roundtrip_re_measures_legacy_text() {
        let mut e = editor();
        e.add_text(&HeuristicMeasurer);
        let mut doc = e.to_document("Camiseta verano");
        assert_eq!(doc.name, "Camiseta verano");
        assert!(doc.allow_text_edit);
        assert!(!doc.allow_image_edit);
        assert_eq!(doc.editable_areas.len(), 1);

        // Rewrite the stored text as a legacy fixed-size box.
        let docs = doc.side_elements.get_mut(&e.current_side()).unwrap();
        docs[0].is_relative_coordinates = false;
        docs[0].element.width = 120.0;
        docs[0].element.height = 30.0;

        let mut fresh = editor();
        fresh.load_document(doc, &HeuristicMeasurer);
        let el = &fresh.elements()[0];
        assert_ne!((el.width, el.height), (120.0, 30.0));
    }

    #[test]
    fn shortcuts_drive_tools_zoom_and_editing() {
        let mut e = editor();
        e.apply_shortcut(ShortcutAction::ToolText);
        assert_eq!(e.tool(), TemplateTool::Text);
        e.apply_shortcut(ShortcutAction::ZoomIn);
        assert_eq!(e.zoom(), 1.25);
        for _ in 0..20 {
            e.apply_shortcut(ShortcutAction::ZoomIn);
        }
        assert_eq!(e.zoom(), 3.0);
        e.apply_shortcut(ShortcutAction::ZoomReset);
        assert_eq!(e.zoom(), 1.0);
        for _ in 0..20 {
            e.apply_shortcut(ShortcutAction::ZoomOut);
        }
        assert_eq!(e.zoom(), 0.25);

        let id = e.add_shape(ShapeType::Rectangle);
        e.apply_shortcut(ShortcutAction::Duplicate);
        assert_eq!(e.elements().len(), 2);
        e.apply_shortcut(ShortcutAction::Delete);
        assert_eq!(e.elements().len(), 1);
        assert_eq!(e.elements()[0].id, id);
    }

    #[test]
    fn key_events_route_through_the_shortcut_map() {
        let mut e = editor();
        e.add_shape(ShapeType::Rectangle);
        let ctrl_z = InputEvent::Key {
            key: "z".to_owned(),
            modifiers: crate::input::Modifiers {
                ctrl: true,
                ..Default::default()
            },
        };
        e.handle_event(&ctrl_z);
        assert!(e.elements().is_empty());
        e.handle_event(&InputEvent::Key {
            key: "y".to_owned(),
            modifiers: crate::input::Modifiers {
                ctrl: true,
                ..Default::default()
            },
        });
        assert_eq!(e.elements().len(), 1);
        // Pointer events route too.
        e.handle_event(&InputEvent::pointer_down(1.0, 1.0));
        assert_eq!(e.selected(), None);
    }

    struct FlakySink {
        fail: bool,
        saved: usize,
    }

    impl TemplateSaveSink for FlakySink {
        fn save(&mut self, doc: &TemplateDocument) -> Result<(), String> {
            if self.fail {
                return Err("timeout".to_owned());
            }
            assert!(!doc.name.is_empty());
            self.saved += 1;
            Ok(())
        }
    }

    #[test]
    fn save_failures_surface_as_notices() {
        let mut e = editor();
        e.add_text(&HeuristicMeasurer);
        let mut sink = FlakySink {
            fail: true,
            saved: 0,
        };
        assert_eq!(
            e.save("Mi plantilla", &mut sink),
            Some(Notice::SaveFailed("timeout".to_owned()))
        );
        sink.fail = false;
        assert_eq!(e.save("Mi plantilla", &mut sink), None);
        assert_eq!(sink.saved, 1);
        assert!(!e.is_saving());
    }
}
