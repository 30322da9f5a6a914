//! Input abstraction layer.
//!
//! Normalizes host pointer, wheel, and keyboard events into plain values
//! the editor consumes. Positions are in screen (canvas-local) pixels;
//! the editor maps them to world space through its camera.

use kurbo::Point;

/// Which pointer button changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
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

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer press, move, or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Identifies the pointer for the lifetime of one press.
    pub pointer_id: u32,
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Primary-button event for pointer 1 without modifiers.
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            pointer_id: 1,
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// A normalized input event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),

    /// Scroll wheel or trackpad. Negative `delta_y` scrolls up.
    Wheel {
        position: Point,
        delta_y: f64,
        modifiers: Modifiers,
    },

    /// Key pressed. `key` is the host's logical key value (`"z"`, `"Delete"`, `" "`).
    KeyDown { key: String, modifiers: Modifiers },

    KeyUp { key: String, modifiers: Modifiers },

    /// The host window lost focus; held keys are released.
    Blur,
}

impl InputEvent {
    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Extract the pointer id if this is a pointer event.
    pub fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::PointerDown(e) | Self::PointerMove(e) | Self::PointerUp(e) => Some(e.pointer_id),
            _ => None,
        }
    }
}
