//! Run time coercion

/// Parse a run time cell, accepting a decimal comma.
///
/// Empty, negative or non-finite values are rejected.
pub fn parse_run_time(text: &str) -> Option<f64> {
    let value: f64 = text.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Raw run time units to hours
pub fn run_time_hours(value: f64) -> f64 {
    value / 1000.0 * 60.0
}
