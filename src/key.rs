use crossterm::event::{KeyCode, KeyEvent};

/// A keystroke as the typing session understands it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A single character to compare against the expected one
    Char(char),
    /// Undo the last keystroke
    Backspace,
    /// Modifiers, navigation keys and anything else that is not one character
    Ignored,
}

impl Key {
    /// Interpret a key identifier such as `"a"`, `"Enter"`, `"Backspace"` or
    /// `"Shift"`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Enter" => Key::Char('\n'),
            "Backspace" => Key::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_char(c),
                    _ => Key::Ignored,
                }
            }
        }
    }

    /// Accept a lone character only if it is a single UTF-16 unit and not a
    /// line terminator. Astral characters such as most emoji, and a raw `\n`
    /// that did not arrive as Enter, count as multi-character input.
    pub fn from_char(c: char) -> Self {
        if c.len_utf16() != 1 || is_line_terminator(c) {
            return Key::Ignored;
        }
        Key::Char(c)
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl From<&KeyEvent> for Key {
    fn from(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Enter => Key::Char('\n'),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Char(c) => Key::from_char(c),
            _ => Key::Ignored,
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Key::from(&event)
    }
}
