//! Descriptive statistics and least-squares fits
//!
//! Moments come from the statrs `Statistics` trait; the rest are small
//! closed-form helpers. Standard deviation follows the sample (n−1) form
//! unless the name says `population`.

use statrs::statistics::Statistics;

use super::ProcessingError;

/// Drop NaN/∞ gaps, keeping order.
pub fn clean(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Fraction of entries that are gaps.
pub fn gap_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let gaps = values.iter().filter(|v| !v.is_finite()).count();
    gaps as f64 / values.len() as f64
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// Sample standard deviation; 0 below two points.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    }
}

/// Population standard deviation; 0 when empty.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().population_std_dev()
    }
}

pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().quadratic_mean()
    }
}

/// Largest absolute sample.
pub fn peak(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().abs_max()
    }
}

/// Excess kurtosis, mean(((x − μ)/s)^4) − 3 with the sample `s`.
///
/// Zero when the spread is degenerate.
pub fn excess_kurtosis(values: &[f64], mean: f64, std: f64) -> f64 {
    if values.is_empty() || std <= 1e-12 {
        return 0.0;
    }
    let fourth = values
        .iter()
        .map(|x| ((x - mean) / std).powi(4))
        .sum::<f64>()
        / values.len() as f64;
    fourth - 3.0
}

/// Peak over RMS; zero for a silent signal.
pub fn crest_factor(peak: f64, rms: f64) -> f64 {
    if rms > 1e-12 {
        peak / rms
    } else {
        0.0
    }
}

/// First differences.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// First-order least-squares line over x = 0, 1, 2, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = slope·x + intercept` against the sample index.
pub fn linear_fit(y: &[f64]) -> Result<LinearFit, ProcessingError> {
    let n = y.len();
    if n < 2 {
        return Err(ProcessingError::InsufficientData {
            needed: 2,
            available: n,
        });
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (v - y_mean);
        sxx += dx * dx;
    }
    if sxx <= 0.0 {
        return Err(ProcessingError::InvalidInput("zero x variance".to_string()));
    }

    let slope = sxy / sxx;
    let fit = LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    };
    if fit.slope.is_finite() && fit.intercept.is_finite() {
        Ok(fit)
    } else {
        Err(ProcessingError::NonFinite("linear fit"))
    }
}

/// Population standard deviation of the residuals around `fit`.
pub fn residual_std(y: &[f64], fit: &LinearFit) -> f64 {
    let residuals: Vec<f64> = y
        .iter()
        .enumerate()
        .map(|(i, v)| v - fit.at(i as f64))
        .collect();
    population_std(&residuals)
}

/// Equal-width histogram over [min, max] with the last bin closed.
///
/// A constant series lands entirely in the middle bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    if values.is_empty() || bins == 0 {
        return counts;
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = hi - lo;

    if width <= 0.0 {
        counts[bins / 2] = values.len();
        return counts;
    }

    for v in values {
        let idx = (((v - lo) / width) * bins as f64).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Shannon entropy normalised by ln(k), k = count of non-zero weights.
///
/// Weights need not sum to 1. Returns 0 when fewer than two weights are
/// non-zero.
pub fn normalized_shannon(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let probs: Vec<f64> = weights
        .iter()
        .filter(|w| **w > 0.0)
        .map(|w| w / total)
        .collect();
    if probs.len() < 2 {
        return 0.0;
    }
    let h: f64 = -probs.iter().map(|p| p * p.ln()).sum::<f64>();
    h / (probs.len() as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_gaps() {
        let values = [1.0, f64::NAN, 2.0, f64::INFINITY, 3.0];
        assert_eq!(clean(&values), vec![1.0, 2.0, 3.0]);
        assert!((gap_fraction(&values) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_moments() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
        assert!((sample_std(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(peak(&[-3.0, 2.0]), 3.0);
        assert!((rms(&[3.0, -3.0]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_moments_are_zero() {
        assert_eq!(sample_std(&[1.0]), 0.0);
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(excess_kurtosis(&[1.0, 1.0, 1.0], 1.0, 0.0), 0.0);
        assert_eq!(crest_factor(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_linear_fit_recovers_line() {
        let y: Vec<f64> = (0..10).map(|i| 0.5 * i as f64 + 2.0).collect();
        let fit = linear_fit(&y).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!(residual_std(&y, &fit) < 1e-12);
    }

    #[test]
    fn test_linear_fit_needs_two_points() {
        assert!(matches!(
            linear_fit(&[1.0]),
            Err(ProcessingError::InsufficientData { needed: 2, available: 1 })
        ));
    }

    #[test]
    fn test_histogram_edges() {
        let counts = histogram(&[0.0, 0.5, 1.0], 2);
        assert_eq!(counts, vec![1, 2]);
        let flat = histogram(&[3.0; 7], 50);
        assert_eq!(flat[25], 7);
        assert_eq!(flat.iter().sum::<usize>(), 7);
    }

    #[test]
    fn test_normalized_shannon() {
        assert!((normalized_shannon(&[1.0, 1.0, 1.0, 1.0]) - 1.0).abs() < 1e-12);
        assert_eq!(normalized_shannon(&[5.0, 0.0, 0.0]), 0.0);
        let skewed = normalized_shannon(&[0.9, 0.1]);
        assert!(skewed > 0.0 && skewed < 1.0);
    }
}
