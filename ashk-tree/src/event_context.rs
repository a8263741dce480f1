//! Event types
//!
//! Input events arriving from the windowing layer, and the tagged
//! [`UiEvent`] delivered to element handlers.

/// Pointer buttons tracked by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// All tracked buttons, in button-state-vector order.
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    /// Position of this button in a [`ButtonStates`] vector.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}

/// Per-button pressed state, indexed by [`MouseButton::index`].
pub type ButtonStates = [bool; 3];

/// Scroll delta types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    /// Scroll by lines (discrete, e.g., mouse wheel notches).
    Lines { x: f32, y: f32 },

    /// Scroll by pixels (smooth, e.g., trackpad).
    Pixels { x: f32, y: f32 },
}

impl ScrollDelta {
    /// Convert to whole pixels, `step` pixels per line.
    pub fn to_pixels(self, step: i32) -> (i32, i32) {
        match self {
            ScrollDelta::Lines { x, y } => (
                (x * step as f32).round() as i32,
                (y * step as f32).round() as i32,
            ),
            ScrollDelta::Pixels { x, y } => (x.round() as i32, y.round() as i32),
        }
    }
}

/// Keyboard modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Named keys (non-character keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Unknown,
}

/// A keyboard key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named (special) key.
    Named(NamedKey),

    /// A character key.
    Character(String),
}

/// A key event (pressed or released).
#[derive(Debug, Clone, PartialEq)]
pub enum KeyEvent {
    Pressed { key: Key, modifiers: Modifiers },
    Released { key: Key, modifiers: Modifiers },
}

impl KeyEvent {
    /// A press of a named key with no modifiers.
    pub fn press(key: NamedKey) -> Self {
        Self::Pressed {
            key: Key::Named(key),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn is_press(&self) -> bool {
        matches!(self, KeyEvent::Pressed { .. })
    }
}

/// Event delivered to element handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The pointer entered the element.
    HoverStart,
    /// The pointer left the element.
    HoverEnd,
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Press and release both happened over this element.
    Click(MouseButton),
    /// Committed text input (routed to the selected text-input element).
    Text(String),
    /// Key press/release (routed to the selected element).
    Key(KeyEvent),
}

/// Raw input from the windowing layer, one variant per input source.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved or a button changed; carries the full current state.
    Pointer {
        x: i32,
        y: i32,
        buttons: ButtonStates,
    },
    Wheel {
        x: i32,
        y: i32,
        delta: ScrollDelta,
    },
    Text(String),
    Key(KeyEvent),
    Resize {
        width: i32,
        height: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_indices_match_all_order() {
        for (i, button) in MouseButton::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn line_deltas_scale_by_step() {
        let delta = ScrollDelta::Lines { x: 0.0, y: -1.0 };
        assert_eq!(delta.to_pixels(60), (0, -60));

        let delta = ScrollDelta::Pixels { x: 2.4, y: 7.6 };
        assert_eq!(delta.to_pixels(60), (2, 8));
    }

    #[test]
    fn press_helper() {
        let event = KeyEvent::press(NamedKey::Enter);
        assert!(event.is_press());
        assert_eq!(
            event,
            KeyEvent::Pressed {
                key: Key::Named(NamedKey::Enter),
                modifiers: Modifiers::NONE
            }
        );
    }
}
