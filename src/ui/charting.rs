use crate::time_series::TimeSeriesPoint;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(wpm_coords: &[TimeSeriesPoint], elapsed_secs: f64) -> (f64, f64) {
    let mut highest_wpm = 0.0;
    for p in wpm_coords {
        if p.wpm > highest_wpm {
            highest_wpm = p.wpm;
        }
    }

    let mut overall_duration = match wpm_coords.last() {
        Some(p) => p.t.max(elapsed_secs),
        None => elapsed_secs,
    };
    if overall_duration < 1.0 {
        overall_duration = 1.0;
    }

    (overall_duration, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
