//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s so the host
//! view never interprets raw key events itself.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolText,
    ToolImage,
    ToolShape,

    // ── Edit ──
    Undo,
    Redo,
    Duplicate,
    Delete,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── UI ──
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware: ⌘ on macOS and Ctrl elsewhere both count as the
/// command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. `key` is the DOM
    /// `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            if modifiers.shift {
                return match key {
                    "z" | "Z" => Some(ShortcutAction::Redo),
                    _ => None,
                };
            }
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "Delete" | "Backspace" => Some(ShortcutAction::Delete),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "t" | "T" => Some(ShortcutAction::ToolText),
            "i" | "I" => Some(ShortcutAction::ToolImage),
            "s" | "S" => Some(ShortcutAction::ToolShape),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}
