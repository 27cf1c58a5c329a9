//! Input abstraction layer.
//!
//! Hosts translate DOM events into `InputEvent`s. Every position is in
//! screen pixels relative to the editor surface's top-left corner; the
//! editor converts to world space itself.

use ng_core::geometry::Point;
use serde::{Deserialize, Serialize};

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    /// Fired by the host after a pointer-up that completed a click.
    Click {
        x: f32,
        y: f32,
    },
    /// Wheel input; only the sign of `delta_y` matters.
    Wheel {
        x: f32,
        y: f32,
        delta_y: f32,
    },
    /// Secondary-button request for a context menu.
    ContextMenu {
        x: f32,
        y: f32,
    },
    Key {
        key: String,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Screen position, for every event that has one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Click { x, y }
            | Self::Wheel { x, y, .. }
            | Self::ContextMenu { x, y } => Some(Point::new(*x, *y)),
            Self::Key { .. } => None,
        }
    }
}
