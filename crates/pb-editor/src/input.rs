//! Input abstraction layer.
//!
//! Normalizes host pointer events into `InputEvent` for the resize
//! controller, plus the modifier and arrow-key types the shortcut map reads.

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Arrow key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
    Up,
    Down,
}

impl ArrowKey {
    /// Parse a `KeyboardEvent.key` value (`"ArrowLeft"`, ...). Case-insensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "arrowleft" => Some(ArrowKey::Left),
            "arrowright" => Some(ArrowKey::Right),
            "arrowup" => Some(ArrowKey::Up),
            "arrowdown" => Some(ArrowKey::Down),
            _ => None,
        }
    }

    /// Sign of the change this key applies along its axis.
    pub fn sign(self) -> f64 {
        match self {
            ArrowKey::Left | ArrowKey::Up => -1.0,
            ArrowKey::Right | ArrowKey::Down => 1.0,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, ArrowKey::Left | ArrowKey::Right)
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on a resize handle.
    PointerDown { x: f64, y: f64, pointer_id: i32 },

    /// Pointer moved while pressed.
    PointerMove { x: f64, y: f64, pointer_id: i32 },

    /// Pointer released.
    PointerUp { x: f64, y: f64, pointer_id: i32 },

    /// The platform aborted the gesture (touch cancelled, focus lost).
    PointerCancel { pointer_id: i32 },
}
