use std::fmt::{self, Display, Formatter};

/// Shown in place of every field before an excerpt has loaded
pub const UNAVAILABLE: &str = "--";

/// Live metrics of a typing session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// active entries typed correctly
    pub correct: usize,
    /// active entries, i.e. keystrokes not backspaced away
    pub typed: usize,
    /// characters still to type, including the current one
    pub left: usize,
    /// active entries typed incorrectly
    pub typos: usize,
    pub raw_wpm: f64,
    pub net_wpm: f64,
}

impl Score {
    /// Percentage of active entries that were correct, 0 when nothing is typed
    pub fn accuracy(&self) -> f64 {
        if self.typed == 0 {
            return 0.0;
        }
        ((self.correct as f64 / self.typed as f64) * 100.0).round()
    }

    /// Label/value pairs for display. `None` renders every value as `--`.
    pub fn labelled(score: Option<&Score>) -> [(&'static str, String); 6] {
        match score {
            Some(s) => [
                ("correct", s.correct.to_string()),
                ("typed", s.typed.to_string()),
                ("left", s.left.to_string()),
                ("typos", s.typos.to_string()),
                ("raw wpm", format!("{:.0}", s.raw_wpm)),
                ("net wpm", format!("{:.0}", s.net_wpm)),
            ],
            None => [
                ("correct", UNAVAILABLE.to_string()),
                ("typed", UNAVAILABLE.to_string()),
                ("left", UNAVAILABLE.to_string()),
                ("typos", UNAVAILABLE.to_string()),
                ("raw wpm", UNAVAILABLE.to_string()),
                ("net wpm", UNAVAILABLE.to_string()),
            ],
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} wpm / {:.0} raw / {}% acc / {} typos",
            self.net_wpm,
            self.raw_wpm,
            self.accuracy(),
            self.typos
        )
    }
}
