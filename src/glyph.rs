//! Visual stand-ins for whitespace.
//!
//! Spaces and line ends are easy to lose track of while typing, so they are
//! drawn as visible glyphs. Only rendering uses these; the session always
//! compares literal characters.

use std::borrow::Cow;

/// Drawn in place of a space
pub const SPACE: char = '\u{02FD}';

/// Drawn in place of a newline, followed by the real line break
pub const LINE_END: &str = "\u{23CE}\n";

/// Glyph part of `LINE_END`, without the break
pub const LINE_END_MARK: char = '\u{23CE}';

/// Display form of a single character
pub fn substitute(c: char) -> Cow<'static, str> {
    match c {
        ' ' => Cow::Owned(SPACE.to_string()),
        '\n' => Cow::Borrowed(LINE_END),
        c => Cow::Owned(c.to_string()),
    }
}

/// Display form of a whole string
pub fn substitute_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            ' ' => out.push(SPACE),
            '\n' => out.push_str(LINE_END),
            c => out.push(c),
        }
    }
    out
}
