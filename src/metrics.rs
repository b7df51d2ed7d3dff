//! Error Metrics
//!
//! Aggregate statistics comparing approximate sums against exact ones.
//! An [`ErrorAccumulator`] is cheap to copy and to merge, so a sweep can
//! fold vectors in parallel and reduce the partial accumulators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdderError;

/// Running totals for one (design, width, K) point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorAccumulator {
    samples: u64,
    erroneous: u64,
    abs_error_sum: u128,
    relative_error_sum: f64,
    relative_samples: u64,
    worst: u64,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, exact: u64, approx: u64) {
        let error = exact.abs_diff(approx);
        self.samples += 1;
        if error != 0 {
            self.erroneous += 1;
        }
        self.abs_error_sum += error as u128;
        self.worst = self.worst.max(error);
        // Zero exact results are left out of the relative error distance.
        if exact != 0 {
            self.relative_error_sum += error as f64 / exact as f64;
            self.relative_samples += 1;
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.samples += other.samples;
        self.erroneous += other.erroneous;
        self.abs_error_sum += other.abs_error_sum;
        self.relative_error_sum += other.relative_error_sum;
        self.relative_samples += other.relative_samples;
        self.worst = self.worst.max(other.worst);
        self
    }

    pub fn finish(&self) -> ErrorMetrics {
        let ratio = |num: f64, den: u64| if den == 0 { 0.0 } else { num / den as f64 };
        ErrorMetrics {
            samples: self.samples,
            mae: ratio(self.abs_error_sum as f64, self.samples),
            mred: ratio(self.relative_error_sum, self.relative_samples),
            wce: self.worst,
            error_rate: ratio(self.erroneous as f64, self.samples),
        }
    }
}

/// Error statistics over a set of test vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub samples: u64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean relative error distance
    pub mred: f64,
    /// Worst-case absolute error
    pub wce: u64,
    /// Fraction of samples with any error
    pub error_rate: f64,
}

impl ErrorMetrics {
    /// Metrics for `(exact, approx)` pairs
    pub fn compute<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut acc = ErrorAccumulator::new();
        for (exact, approx) in pairs {
            acc.record(exact, approx);
        }
        acc.finish()
    }

    pub fn is_exact(&self) -> bool {
        self.wce == 0
    }
}

/// Scalar statistic selectable for series and objectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Mae,
    Mred,
    Wce,
    ErrorRate,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mae, Metric::Mred, Metric::Wce, Metric::ErrorRate];

    pub fn value(&self, metrics: &ErrorMetrics) -> f64 {
        match self {
            Metric::Mae => metrics.mae,
            Metric::Mred => metrics.mred,
            Metric::Wce => metrics.wce as f64,
            Metric::ErrorRate => metrics.error_rate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Mae => "Mean Absolute Error",
            Metric::Mred => "Mean Relative Error Distance",
            Metric::Wce => "Worst-Case Error",
            Metric::ErrorRate => "Error Rate",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Mae => "mae",
            Metric::Mred => "mred",
            Metric::Wce => "wce",
            Metric::ErrorRate => "error-rate",
        })
    }
}

impl FromStr for Metric {
    type Err = AdderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mae" => Ok(Metric::Mae),
            "mred" => Ok(Metric::Mred),
            "wce" => Ok(Metric::Wce),
            "error-rate" | "er" => Ok(Metric::ErrorRate),
            _ => Err(AdderError::UnknownName {
                kind: "metric",
                name: s.to_string(),
                expected: "mae, mred, wce, error-rate",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_by_hand() {
        let metrics = ErrorMetrics::compute([(10, 10), (10, 6), (0, 2), (4, 5)]);
        assert_eq!(metrics.samples, 4);
        assert_eq!(metrics.wce, 4);
        assert!((metrics.mae - 7.0 / 4.0).abs() < 1e-12);
        // Relative: 0, 0.4, (skipped), 0.25
        assert!((metrics.mred - 0.65 / 3.0).abs() < 1e-12);
        assert!((metrics.error_rate - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let pairs = [(100, 96), (7, 7), (0, 0), (255, 0), (31, 33)];
        let whole = ErrorMetrics::compute(pairs);

        let mut left = ErrorAccumulator::new();
        let mut right = ErrorAccumulator::new();
        for (i, &(exact, approx)) in pairs.iter().enumerate() {
            if i % 2 == 0 {
                left.record(exact, approx);
            } else {
                right.record(exact, approx);
            }
        }
        let merged = left.merge(right).finish();
        assert_eq!(merged.samples, whole.samples);
        assert_eq!(merged.wce, whole.wce);
        assert!((merged.mae - whole.mae).abs() < 1e-12);
        assert!((merged.mred - whole.mred).abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_zero() {
        let metrics = ErrorAccumulator::new().finish();
        assert_eq!(metrics, ErrorMetrics::default());
        assert!(metrics.is_exact());
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("ER".parse::<Metric>().unwrap(), Metric::ErrorRate);
        assert_eq!(Metric::Mred.to_string().parse::<Metric>().unwrap(), Metric::Mred);
        assert!(matches!(
            "psnr".parse::<Metric>(),
            Err(AdderError::UnknownName { kind: "metric", .. })
        ));
    }
}
