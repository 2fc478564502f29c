use super::*;
use crossterm::event::{Event, KeyEventState, KeyModifiers};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn arrows_and_pages_decode_to_navigation() {
    assert_eq!(decode_key(&key(KeyCode::Up)), Some(Key::Up));
    assert_eq!(decode_key(&key(KeyCode::Down)), Some(Key::Down));
    assert_eq!(decode_key(&key(KeyCode::PageUp)), Some(Key::PageUp));
    assert_eq!(decode_key(&key(KeyCode::PageDown)), Some(Key::PageDown));
}

#[test]
fn space_is_toggle_and_enter_is_confirm() {
    assert_eq!(decode_key(&key(KeyCode::Char(' '))), Some(Key::Toggle));
    assert_eq!(decode_key(&key(KeyCode::Enter)), Some(Key::Confirm));
}

#[test]
fn printable_characters_pass_through() {
    assert_eq!(decode_key(&key(KeyCode::Char('x'))), Some(Key::Char('x')));
    assert_eq!(decode_key(&key(KeyCode::Char('7'))), Some(Key::Char('7')));
}

#[test]
fn releases_are_dropped() {
    let event = KeyEvent {
        code: KeyCode::Up,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    };
    assert_eq!(decode_key(&event), None);
}

#[test]
fn unmapped_keys_are_dropped() {
    assert_eq!(decode_key(&key(KeyCode::Esc)), None);
    assert_eq!(decode_key(&key(KeyCode::Tab)), None);
    assert_eq!(decode_key(&key(KeyCode::F(1))), None);
}

#[test]
fn non_key_events_are_dropped() {
    assert_eq!(decode(&Event::Resize(80, 24)), None);
    assert_eq!(decode(&Event::FocusGained), None);
}
