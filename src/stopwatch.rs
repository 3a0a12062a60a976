use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Measures how long an excerpt has been actively typed.
///
/// Time only accumulates between `start` and `pause`. Nothing runs in the
/// background: the clock is read when starting, pausing and asking for the
/// elapsed time.
#[derive(Debug, Clone)]
pub struct Stopwatch<C: Clock = SystemClock> {
    clock: C,
    running: bool,
    // last time `start` was called, only meaningful while running
    started_at: Option<Instant>,
    // time accumulated by every finished running interval
    sub_total: Duration,
}

impl Stopwatch<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Stopwatch<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Stopwatch<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            running: false,
            started_at: None,
            sub_total: Duration::ZERO,
        }
    }

    /// Begin (or restart) the live interval.
    ///
    /// Starting while already running moves the interval start to now; the
    /// accumulated subtotal is left alone.
    pub fn start(&mut self) {
        self.running = true;
        self.started_at = Some(self.clock.now());
    }

    /// Close the live interval and fold it into the subtotal. No-op when
    /// not running.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        if let Some(started_at) = self.started_at {
            self.sub_total += self.clock.now().saturating_duration_since(started_at);
        }
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.started_at = None;
        self.sub_total = Duration::ZERO;
    }

    pub fn elapsed(&self) -> Duration {
        match (self.running, self.started_at) {
            (true, Some(started_at)) => {
                self.sub_total + self.clock.now().saturating_duration_since(started_at)
            }
            _ => self.sub_total,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_millis() as f64
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }
}
