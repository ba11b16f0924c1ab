//! Numeric helpers shared by every calculator.

/// Sum of each `period`-sized window, oldest window first.
///
/// Empty when `period` is zero or exceeds the input length.
pub fn window_sums(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    values.windows(period).map(|w| w.iter().sum()).collect()
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance around a precomputed `mean` (divides by `N`).
pub fn population_variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Trailing `n` values, or the whole slice when it is shorter.
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}
