//! Input abstraction layer.
//!
//! Normalizes host pointer, wheel, and keyboard events into a single
//! `InputEvent` type. Coordinates are screen pixels relative to the canvas.

use flow_core::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// ⌘ on macOS.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Whether the click should extend the selection instead of replacing it.
    pub fn extends_selection(&self) -> bool {
        self.shift || self.ctrl
    }
}

/// Unified input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifiers: Modifiers },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Fired by the host after a pointer-down/up pair on the same spot.
    Click { x: f64, y: f64, modifiers: Modifiers },
    DoubleClick { x: f64, y: f64 },
    /// Positive `delta_y` scrolls down.
    Wheel { x: f64, y: f64, delta_y: f64 },
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Delete"`, `"z"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn click(x: f64, y: f64) -> Self {
        Self::Click {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Screen position, for events that have one.
    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Click { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some(Point::new(x, y)),
            Self::Key { .. } => None,
        }
    }
}
