//! Drag gestures as value types.
//!
//! A [`DragSession`] is created on pointer-down and dropped on pointer-up,
//! however the gesture ends. All deltas are computed against the state
//! captured at session start, never against the previous mouse event, so
//! a drag is a pure function of (initial state, current point) and cannot
//! accumulate rounding drift.

use pk_core::coords::Point;

/// What a drag is doing to the grabbed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Translate the whole item.
    Move,
    /// Resize from the bottom-right corner, top-left anchored.
    Resize,
    /// Rotate about the item center.
    Rotate,
}

/// One in-progress drag: the mode, the pointer position at start, and the
/// item geometry at start (`S` is whatever snapshot the editor needs).
#[derive(Debug, Clone, Copy)]
pub struct DragSession<S> {
    pub mode: DragMode,
    pub start: Point,
    pub initial: S,
}

impl<S> DragSession<S> {
    pub fn new(mode: DragMode, start: Point, initial: S) -> Self {
        Self {
            mode,
            start,
            initial,
        }
    }

    /// Pointer delta since the session began.
    pub fn delta(&self, current: Point) -> (f32, f32) {
        (current.x - self.start.x, current.y - self.start.y)
    }
}
