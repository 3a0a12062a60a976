#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Net WPM sampled once per whole second of active typing
#[derive(Debug, Clone, Default)]
pub struct WpmSeries {
    points: Vec<TimeSeriesPoint>,
}

impl WpmSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `wpm` at `elapsed_secs`. Samples inside a second that already
    /// has a point are dropped, as are samples before the first second.
    pub fn sample(&mut self, elapsed_secs: f64, wpm: f64) {
        let second = elapsed_secs.floor();
        if second < 1.0 {
            return;
        }
        match self.points.last() {
            Some(last) if last.t >= second => {}
            _ => self.points.push(TimeSeriesPoint::new(second, wpm)),
        }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
