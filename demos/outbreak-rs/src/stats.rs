/// z-score for a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Arithmetic mean; zero when there are no observations.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Normal-approximation 95% confidence interval for the mean, with the lower
/// bound floored at zero. An empty sample gives `(0, 0)` and a single
/// observation gives the degenerate interval `(x, x)`.
pub fn confidence_interval_95(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    let mean = mean(values);
    if n < 2 {
        return (mean, mean);
    }

    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let standard_error = variance.sqrt() / (n as f64).sqrt();
    let margin = Z_95 * standard_error;

    (f64::max(0., mean - margin), mean + margin)
}
