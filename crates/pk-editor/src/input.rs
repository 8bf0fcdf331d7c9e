//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `InputEvent` enum
//! consumed by the editor state machines. Coordinates are canvas px,
//! already divided by the current zoom by the host view.

use pk_core::coords::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Platform-neutral "command": ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown { pos: Point, modifiers: Modifiers },

    /// Pointer moved.
    PointerMove { pos: Point, modifiers: Modifiers },

    /// Pointer released.
    PointerUp { pos: Point },

    /// Keyboard event, `key` as in the DOM `KeyboardEvent.key`.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            pos: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            pos: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            pos: Point::new(x, y),
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos } => Some(*pos),
            _ => None,
        }
    }
}
