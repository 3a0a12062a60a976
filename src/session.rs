use std::borrow::Cow;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use log::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::glyph;
use crate::key::Key;
use crate::score::Score;
use crate::stopwatch::Stopwatch;
use crate::wpm::{net_wpm, raw_wpm};

/// Shown instead of the excerpt while nothing is loaded
pub const LOADING: &str = "loading...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// no excerpt yet
    Loading,
    /// a character is waiting to be typed
    Active,
    /// every character has been typed; backspace can still reopen it
    Finished,
}

/// One keystroke that has not been backspaced away
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedEntry {
    /// the character that was expected at this position
    pub key: char,
    pub correct: bool,
}

impl TypedEntry {
    pub fn display_key(&self) -> Cow<'static, str> {
        glyph::substitute(self.key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// `load_text` called on a session that already holds an excerpt
    AlreadyLoaded,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyLoaded => write!(f, "an excerpt is already loaded; reset first"),
        }
    }
}

impl Error for SessionError {}

/// State of one excerpt being typed.
///
/// `remaining` holds the characters after `current`, nearest first. Every
/// accepted keystroke moves `current` into `typed` and pulls the next one
/// from the front of `remaining`; backspace walks the same path backwards.
#[derive(Debug)]
pub struct TypingSession<C: Clock = SystemClock> {
    remaining: Option<VecDeque<char>>,
    current: Option<char>,
    typed: Vec<TypedEntry>,
    total_typed: usize,
    focused: bool,
    stopwatch: Stopwatch<C>,
}

impl TypingSession<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TypingSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TypingSession<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            remaining: None,
            current: None,
            typed: Vec::new(),
            total_typed: 0,
            focused: false,
            stopwatch: Stopwatch::with_clock(clock),
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.remaining, self.current) {
            (None, _) => Phase::Loading,
            (Some(_), Some(_)) => Phase::Active,
            (Some(_), None) => Phase::Finished,
        }
    }

    /// Install the excerpt to type. An empty excerpt is immediately finished.
    pub fn load_text(&mut self, text: &str) -> Result<(), SessionError> {
        if self.phase() != Phase::Loading {
            warn!("refusing to load a new excerpt over an existing one");
            return Err(SessionError::AlreadyLoaded);
        }

        let mut chars: VecDeque<char> = text.chars().collect();
        self.current = chars.pop_front();
        self.remaining = Some(chars);
        debug!(
            "loaded excerpt of {} chars, phase {}",
            text.chars().count(),
            self.phase()
        );

        if self.focused && self.phase() == Phase::Active {
            self.stopwatch.start();
        }
        Ok(())
    }

    /// Handle a raw key identifier such as `"a"`, `"Enter"` or `"Shift"`
    pub fn handle_input(&mut self, raw_key: &str) {
        self.handle_key(Key::parse(raw_key));
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Backspace => self.handle_backspace(),
            Key::Char(c) => self.type_char(c),
            Key::Ignored => {}
        }
    }

    fn type_char(&mut self, typed: char) {
        let (Some(remaining), Some(expected)) = (self.remaining.as_mut(), self.current) else {
            return;
        };

        self.total_typed += 1;
        self.typed.push(TypedEntry {
            key: expected,
            correct: typed == expected,
        });
        self.current = remaining.pop_front();

        if self.current.is_none() {
            debug!(
                "excerpt finished after {} keystrokes in {:?}",
                self.total_typed,
                self.stopwatch.elapsed()
            );
            self.stopwatch.pause();
        }
    }

    /// Undo the last keystroke. Does nothing when there is nothing to undo.
    pub fn handle_backspace(&mut self) {
        let Some(remaining) = self.remaining.as_mut() else {
            return;
        };
        let Some(entry) = self.typed.pop() else {
            return;
        };

        let was_finished = self.current.is_none();
        if let Some(current) = self.current {
            remaining.push_front(current);
        }
        self.current = Some(entry.key);

        if was_finished {
            debug!("backspaced out of a finished excerpt");
            if self.focused {
                self.stopwatch.start();
            }
        }
    }

    /// The typing area gained focus
    pub fn activate(&mut self) {
        self.focused = true;
        if self.phase() == Phase::Active && !self.stopwatch.is_running() {
            self.stopwatch.start();
        }
    }

    /// The typing area lost focus
    pub fn deactivate(&mut self) {
        self.focused = false;
        self.stopwatch.pause();
    }

    /// Drop the excerpt and all progress, back to `Loading`
    pub fn reset(&mut self) {
        self.remaining = None;
        self.current = None;
        self.typed.clear();
        self.total_typed = 0;
        self.stopwatch.reset();
    }

    /// Live metrics, or `None` before an excerpt has loaded
    pub fn score(&self) -> Option<Score> {
        let remaining = self.remaining.as_ref()?;

        let correct = self.typed.iter().filter(|e| e.correct).count();
        let typos = self.typed.len() - correct;
        let elapsed_ms = self.stopwatch.elapsed_ms();

        Some(Score {
            correct,
            typed: self.typed.len(),
            left: remaining.len() + usize::from(self.current.is_some()),
            typos,
            raw_wpm: raw_wpm(self.total_typed, elapsed_ms),
            net_wpm: net_wpm(self.total_typed, typos, elapsed_ms),
        })
    }

    /// Text after the current character with whitespace glyphs applied, or
    /// `None` while loading
    pub fn remaining_text_display(&self) -> Option<String> {
        self.remaining_text()
            .map(|text| glyph::substitute_str(&text))
    }

    pub fn display_current_char(&self) -> Option<Cow<'static, str>> {
        self.current.map(glyph::substitute)
    }

    /// Literal text after the current character
    pub fn remaining_text(&self) -> Option<String> {
        self.remaining.as_ref().map(|r| r.iter().collect())
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.as_ref().map_or(0, VecDeque::len)
    }

    pub fn current(&self) -> Option<char> {
        self.current
    }

    pub fn typed(&self) -> &[TypedEntry] {
        &self.typed
    }

    pub fn total_typed(&self) -> usize {
        self.total_typed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    pub fn stopwatch(&self) -> &Stopwatch<C> {
        &self.stopwatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use assert_matches::assert_matches;

    fn session(text: &str) -> (ManualClock, TypingSession<ManualClock>) {
        let clock = ManualClock::new();
        let mut session = TypingSession::with_clock(clock.clone());
        session.load_text(text).unwrap();
        (clock, session)
    }

    fn snapshot<C: Clock>(s: &TypingSession<C>) -> (Option<String>, Option<char>, Vec<TypedEntry>) {
        (s.remaining_text(), s.current(), s.typed().to_vec())
    }

    #[test]
    fn test_new_session_is_loading() {
        let session = TypingSession::new();
        assert_eq!(session.phase(), Phase::Loading);
        assert_eq!(session.score(), None);
        assert_eq!(session.remaining_text_display(), None);
        assert_eq!(session.display_current_char(), None);
    }

    #[test]
    fn test_load_text() {
        let (_, session) = session("ab");

        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current(), Some('a'));
        assert_eq!(session.remaining_text().as_deref(), Some("b"));
        assert_eq!(session.remaining_len(), 1);
    }

    #[test]
    fn test_load_empty_text_is_finished() {
        let (_, mut session) = session("");

        assert_eq!(session.phase(), Phase::Finished);
        session.handle_input("a");
        session.handle_input("Backspace");
        assert_eq!(session.total_typed(), 0);
        assert!(session.typed().is_empty());
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_load_twice_is_rejected() {
        let (_, mut session) = session("ab");
        session.handle_input("a");

        assert_matches!(session.load_text("xyz"), Err(SessionError::AlreadyLoaded));
        assert_eq!(session.current(), Some('b'));
        assert_eq!(session.typed().len(), 1);
    }

    #[test]
    fn test_typing_correct_then_wrong_finishes() {
        let (_, mut session) = session("ab");

        session.handle_input("a");
        assert_eq!(session.current(), Some('b'));
        assert_eq!(session.typed().len(), 1);
        assert!(session.typed()[0].correct);

        session.handle_input("x");
        assert!(!session.typed()[1].correct);
        assert_eq!(session.current(), None);
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_case_sensitive() {
        let (_, mut session) = session("A");
        session.handle_input("a");
        assert!(!session.typed()[0].correct);
    }

    #[test]
    fn test_enter_matches_newline() {
        let (_, mut session) = session("{\n}");
        session.handle_input("{");
        session.handle_input("Enter");

        assert!(session.typed()[1].correct);
        assert_eq!(session.typed()[1].display_key(), "⏎\n");
        assert_eq!(session.current(), Some('}'));
    }

    #[test]
    fn test_multi_char_keys_are_ignored() {
        let (_, mut session) = session("ab");
        let before = snapshot(&session);

        for raw in ["Shift", "ArrowRight", "Tab", "Meta", "😀"] {
            session.handle_input(raw);
        }

        assert_eq!(snapshot(&session), before);
        assert_eq!(session.total_typed(), 0);
    }

    #[test]
    fn test_input_after_finish_is_ignored() {
        let (_, mut session) = session("a");
        session.handle_input("a");
        session.handle_input("b");

        assert_eq!(session.total_typed(), 1);
        assert_eq!(session.typed().len(), 1);
    }

    #[test]
    fn test_input_while_loading_is_ignored() {
        let mut session = TypingSession::new();
        session.handle_input("a");
        session.handle_backspace();

        assert_eq!(session.total_typed(), 0);
        assert_eq!(session.phase(), Phase::Loading);
    }

    #[test]
    fn test_input_then_backspace_restores_state() {
        for key in ["a", "x", " ", "Enter"] {
            for text in ["a b", " \nz", "\n\n", "ab"] {
                let (_, mut session) = session(text);
                let before = snapshot(&session);

                session.handle_input(key);
                session.handle_input("Backspace");

                assert_eq!(snapshot(&session), before, "key {key:?} text {text:?}");
            }
        }
    }

    #[test]
    fn test_backspace_restores_whitespace_literals() {
        let (_, mut session) = session(" \nx");
        session.handle_input(" ");
        session.handle_input("Enter");
        assert_eq!(session.current(), Some('x'));

        session.handle_backspace();
        assert_eq!(session.current(), Some('\n'));
        session.handle_backspace();
        assert_eq!(session.current(), Some(' '));
        assert_eq!(session.remaining_text().as_deref(), Some("\nx"));
    }

    #[test]
    fn test_backspace_from_finished_reopens() {
        let (_, mut session) = session("ab");
        session.handle_input("a");
        session.handle_input("b");
        assert_eq!(session.phase(), Phase::Finished);

        session.handle_backspace();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current(), Some('b'));
        assert_eq!(session.remaining_len(), 0);
    }

    #[test]
    fn test_backspace_without_history_is_noop() {
        let (_, mut session) = session("ab");
        let before = snapshot(&session);

        session.handle_backspace();

        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_total_typed_survives_backspace() {
        let (_, mut session) = session("abc");
        session.handle_input("x");
        session.handle_input("Backspace");
        session.handle_input("a");

        assert_eq!(session.total_typed(), 2);
        assert_eq!(session.typed().len(), 1);
        assert!(session.typed().len() <= session.total_typed());
    }

    #[test]
    fn test_chars_left_moves_by_one() {
        let (_, mut session) = session("hello");
        let left = |s: &TypingSession<ManualClock>| s.score().unwrap().left;

        assert_eq!(left(&session), 5);
        session.handle_input("h");
        assert_eq!(left(&session), 4);
        session.handle_input("Backspace");
        assert_eq!(left(&session), 5);
    }

    #[test]
    fn test_score_counts() {
        let (_, mut session) = session("abcd");
        session.handle_input("a");
        session.handle_input("x");
        session.handle_input("c");

        let score = session.score().unwrap();
        assert_eq!(score.correct, 2);
        assert_eq!(score.typed, 3);
        assert_eq!(score.typos, 1);
        assert_eq!(score.left, 1);
        // stopwatch never started
        assert_eq!(score.raw_wpm, 0.0);
        assert_eq!(score.net_wpm, 0.0);
    }

    #[test]
    fn test_score_uses_stopwatch() {
        let (clock, mut session) = session(&"a".repeat(400));
        session.activate();
        for _ in 0..300 {
            session.handle_input("a");
        }
        clock.advance_ms(60_000);

        let score = session.score().unwrap();
        assert_eq!(score.raw_wpm, 60.0);
        assert_eq!(score.net_wpm, 60.0);
    }

    #[test]
    fn test_focus_controls_stopwatch() {
        let (clock, mut session) = session("abc");

        clock.advance_ms(500);
        assert_eq!(session.elapsed(), Duration::ZERO);

        session.activate();
        clock.advance_ms(100);
        session.deactivate();
        clock.advance_ms(1000);
        session.activate();
        clock.advance_ms(50);

        assert!(session.is_focused());
        assert_eq!(session.elapsed(), Duration::from_millis(150));
    }

    #[test]
    fn test_repeated_activate_keeps_time() {
        let (clock, mut session) = session("abc");
        session.activate();
        clock.advance_ms(100);
        session.activate();

        assert_eq!(session.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn test_finish_freezes_elapsed() {
        let (clock, mut session) = session("ab");
        session.activate();
        clock.advance_ms(200);
        session.handle_input("a");
        session.handle_input("b");
        clock.advance_ms(5000);

        assert_eq!(session.elapsed(), Duration::from_millis(200));

        session.handle_backspace();
        clock.advance_ms(100);
        assert_eq!(session.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn test_activate_when_finished_does_not_run() {
        let (clock, mut session) = session("a");
        session.handle_input("a");
        session.activate();
        clock.advance_ms(100);

        assert!(!session.stopwatch().is_running());
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_load_while_focused_starts_timing() {
        let clock = ManualClock::new();
        let mut session = TypingSession::with_clock(clock.clone());
        session.activate();
        clock.advance_ms(1000);
        session.load_text("abc").unwrap();
        clock.advance_ms(10);

        assert_eq!(session.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn test_reset_returns_to_loading() {
        let (clock, mut session) = session("abc");
        session.activate();
        session.handle_input("a");
        clock.advance_ms(10);

        session.reset();

        assert_eq!(session.phase(), Phase::Loading);
        assert_eq!(session.total_typed(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(session.load_text("xyz").is_ok());
        assert_eq!(session.current(), Some('x'));
    }

    #[test]
    fn test_display_helpers() {
        let (_, mut session) = session("a b\nc");

        assert_eq!(session.display_current_char().as_deref(), Some("a"));
        assert_eq!(session.remaining_text_display().as_deref(), Some("˽b⏎\nc"));

        session.handle_input("a");
        assert_eq!(session.display_current_char().as_deref(), Some("˽"));
        assert_eq!(session.typed()[0].display_key(), "a");
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Loading.to_string(), "Loading");
        assert_eq!(Phase::Finished.to_string(), "Finished");
    }
}
