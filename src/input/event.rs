//! Key events decoded once at the input boundary.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// A single decoded keypress.
///
/// Escape sequences are resolved at the read boundary; nothing downstream
/// ever sees raw bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    PageUp,
    PageDown,
    /// Space. Only meaningful to widgets in toggle mode.
    Toggle,
    /// Enter / carriage return.
    Confirm,
    /// Any other printable character.
    Char(char),
}

/// Decode a terminal event into a [`Key`], dropping everything the UI has no
/// use for (key releases, mouse, resize, focus, paste).
pub fn decode(event: &Event) -> Option<Key> {
    match event {
        Event::Key(key) => decode_key(key),
        _ => None,
    }
}

pub fn decode_key(event: &KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Enter => Some(Key::Confirm),
        KeyCode::Char(' ') => Some(Key::Toggle),
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/event.rs"]
mod tests;
