//! Descriptive statistics over slices of observed values
//!
//! All functions take only non-missing values; callers drop nulls first.

use std::cmp::Ordering;

use serde::Serialize;

/// Arithmetic mean; `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Sample variance with an `n - 1` denominator; `None` below two values
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    #[allow(clippy::cast_precision_loss)]
    let denominator = (values.len() - 1) as f64;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / denominator)
}

/// Sample standard deviation
#[must_use]
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Sorted copy of the values
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Quantile of sorted data by linear interpolation between order statistics
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let position = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let weight = position - lower as f64;
    Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

/// Five-number box statistics with whiskers at the most extreme values
/// within 1.5 IQR of the quartiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxStats {
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let reach = 1.5 * (q3 - q1);

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= q1 - reach)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + reach)
            .unwrap_or(q3);

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

/// Pearson correlation of paired values; NaN when either side is constant
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    Some(if denominator > 0.0 {
        (sxy / denominator).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_and_sample_sd() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(mean(&values).unwrap(), 5.0));
        assert!(close(sample_variance(&values).unwrap(), 32.0 / 7.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_sd(&[1.0]), None);
    }

    #[test]
    fn test_quantiles_interpolate() {
        let data = sorted(&[4.0, 1.0, 3.0, 2.0]);
        assert!(close(quantile_sorted(&data, 0.5).unwrap(), 2.5));
        assert!(close(quantile_sorted(&data, 0.25).unwrap(), 1.75));
        assert!(close(quantile_sorted(&data, 1.0).unwrap(), 4.0));
        assert_eq!(quantile_sorted(&data, 1.5), None);
    }

    #[test]
    fn test_box_whiskers_exclude_outliers() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!(close(stats.median, 3.5));
        assert!(close(stats.q1, 2.25));
        assert!(close(stats.q3, 4.75));
        assert!(close(stats.upper_whisker, 5.0));
        assert!(close(stats.lower_whisker, 1.0));
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!(close(pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0));
        assert!(close(pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0));
        assert!(pearson(&x, &[1.0; 4]).unwrap().is_nan());
        assert_eq!(pearson(&x, &[1.0]), None);
    }
}
