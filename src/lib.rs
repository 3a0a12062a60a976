// Library surface for headless/integration tests and reuse.
// The typing core (clock, stopwatch, wpm, key, session, score) has no
// terminal dependencies beyond key event conversion.
pub mod app;
pub mod clock;
pub mod config;
pub mod excerpt;
pub mod glyph;
pub mod key;
pub mod runtime;
pub mod score;
pub mod session;
pub mod stopwatch;
pub mod time_series;
pub mod ui;
pub mod wpm;

pub use session::{Phase, TypedEntry, TypingSession};
pub use stopwatch::Stopwatch;
