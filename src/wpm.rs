//! Typing speed equations.
//!
//! A "word" is five characters. Elapsed time is given in milliseconds, so
//! `typed / 5 / (elapsed_ms / 60000)` simplifies to `typed * 12000 /
//! elapsed_ms`.

/// Characters per standard word
pub const CHARS_PER_WORD: f64 = 5.0;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Words per minute counting every keystroke, errors included.
///
/// Returns 0 instead of NaN or infinity when nothing was typed or no time
/// has elapsed.
pub fn raw_wpm(typed: usize, elapsed_ms: f64) -> f64 {
    let value = (typed as f64 * 12_000.0) / elapsed_ms;
    if !value.is_finite() || value == 0.0 {
        return 0.0;
    }
    value
}

/// Effective words per minute once uncorrected typos are subtracted.
///
/// Never negative: more typos than typed words reads as 0.
pub fn net_wpm(typed: usize, typos: usize, elapsed_ms: f64) -> f64 {
    let value = ((typed as f64 / CHARS_PER_WORD) - typos as f64) * MS_PER_MINUTE / elapsed_ms;
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    value
}
