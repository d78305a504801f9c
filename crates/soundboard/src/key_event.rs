//! Key events as seen by the soundboard.
//!
//! Raw `rdev` events are resolved exactly once, at the listener boundary, into
//! a [`KeyEvent`]. Everything downstream (hotkey dispatch, the key-capture
//! prompt) works on that tagged value and the [`KeyId`] it yields.

use std::fmt;

use rdev::{Event, EventType, Key};

/// A key press after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character, as produced with the current layout and modifiers.
    Character(char),
    /// A non-printing key, by lower-case name (`space`, `f1`, `esc`, ...).
    Named(String),
    /// Anything that could not be resolved. Always ignored.
    Unknown,
}

impl KeyEvent {
    /// Resolve an `rdev` event. Returns `None` for everything except key presses.
    pub fn from_rdev(event: &Event) -> Option<Self> {
        match event.event_type {
            EventType::KeyPress(key) => Some(Self::resolve(event.name.as_deref(), key)),
            _ => None,
        }
    }

    /// Resolve a key press from its produced text and its physical key.
    ///
    /// A single printable, non-whitespace character wins; otherwise the
    /// physical key's name is used.
    pub fn resolve(text: Option<&str>, key: Key) -> Self {
        if let Some(c) = text.and_then(single_printable_char) {
            return KeyEvent::Character(c);
        }

        match key_name(key) {
            Some(name) => KeyEvent::Named(name.to_string()),
            None => KeyEvent::Unknown,
        }
    }

    /// Registry key for this event, `None` for [`KeyEvent::Unknown`].
    pub fn key_id(&self) -> Option<KeyId> {
        match self {
            KeyEvent::Character(c) => Some(KeyId::Char(*c)),
            KeyEvent::Named(name) => Some(KeyId::Named(name.clone())),
            KeyEvent::Unknown => None,
        }
    }
}

/// Identifier a sound is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyId {
    /// Printable character.
    Char(char),
    /// Named key.
    Named(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{}", c),
            KeyId::Named(name) => f.write_str(name),
        }
    }
}

fn single_printable_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() && !c.is_whitespace() => Some(c),
        _ => None,
    }
}

fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Space => "space",
        Key::Return | Key::KpReturn => "enter",
        Key::Escape => "esc",
        Key::Tab => "tab",
        Key::Backspace => "backspace",
        Key::Delete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "page_up",
        Key::PageDown => "page_down",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::CapsLock => "caps_lock",
        Key::NumLock => "num_lock",
        Key::ScrollLock => "scroll_lock",
        Key::PrintScreen => "print_screen",
        Key::Pause => "pause",
        Key::ShiftLeft => "shift",
        Key::ShiftRight => "shift_r",
        Key::ControlLeft => "ctrl_l",
        Key::ControlRight => "ctrl_r",
        Key::Alt => "alt_l",
        Key::AltGr => "alt_gr",
        Key::MetaLeft => "cmd",
        Key::MetaRight => "cmd_r",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        _ => return None,
    };
    Some(name)
}
