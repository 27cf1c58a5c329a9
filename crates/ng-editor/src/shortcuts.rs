//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The editor handles most of them itself; clipboard actions are handed
//! back to the host, which owns clipboard access.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Delete the selected nodes.
    Delete,
    /// Cancel a pending connection and close the context menu.
    Cancel,
    SelectAll,
    Copy,
    Cut,
    Paste,
}

impl ShortcutAction {
    /// Whether the host has to service this action (clipboard access).
    pub fn is_clipboard(self) -> bool {
        matches!(
            self,
            ShortcutAction::Copy | ShortcutAction::Cut | ShortcutAction::Paste
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::Delete => "delete",
            ShortcutAction::Cancel => "cancel",
            ShortcutAction::SelectAll => "select_all",
            ShortcutAction::Copy => "copy",
            ShortcutAction::Cut => "cut",
            ShortcutAction::Paste => "paste",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// `meta` (⌘) and `ctrl` are interchangeable.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"a"`, `"Delete"`).
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}
