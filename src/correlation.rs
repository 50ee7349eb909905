//! Cross-metric correlation
//!
//! Pearson correlation between two daily series, computed over the dates both
//! series share. Degenerate inputs (too few shared dates, a constant series)
//! yield exactly `0.0`, never NaN.
//!
//! Multi-metric selections are analysed pair by pair: every unordered pair is
//! evaluated on its own, with no multivariate model and no correction for
//! multiple comparisons.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{HealthSnapshot, MetricKind, MetricSeries};

/// Absolute coefficient above which a correlation is reported as an insight
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.3;

/// Minimum number of shared dates needed to compute a coefficient
pub const MIN_COMMON_POINTS: usize = 3;

/// Pearson correlation coefficient of `a` and `b` over their common dates.
///
/// Returns a value in `[-1, 1]`, or `0.0` when fewer than
/// [`MIN_COMMON_POINTS`] dates are shared or either side has zero variance.
pub fn correlate(a: &MetricSeries, b: &MetricSeries) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .points()
        .iter()
        .filter_map(|p| b.value_on(p.date).map(|other| (p.value, other)))
        .collect();

    if pairs.len() < MIN_COMMON_POINTS {
        return 0.0;
    }

    // Compare values directly; the mean of a constant like 4.1 can be one ulp off.
    let (first_a, first_b) = pairs[0];
    if pairs.iter().all(|(x, _)| *x == first_a) || pairs.iter().all(|(_, y)| *y == first_b) {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Whether a coefficient is strong enough to surface as an insight
pub fn is_significant(coefficient: f64) -> bool {
    coefficient.abs() > SIGNIFICANCE_THRESHOLD
}

/// Sign of a correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Positive for coefficients above zero, negative otherwise
    pub fn from_coefficient(coefficient: f64) -> Self {
        if coefficient > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}

/// Correlation between two metrics of a snapshot. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub metric_a: MetricKind,
    pub metric_b: MetricKind,
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    /// Absolute coefficient in [0, 1]
    pub strength: f64,
    pub direction: Direction,
    pub significant: bool,
}

impl CorrelationResult {
    pub fn from_coefficient(metric_a: MetricKind, metric_b: MetricKind, coefficient: f64) -> Self {
        Self {
            metric_a,
            metric_b,
            coefficient,
            strength: coefficient.abs(),
            direction: Direction::from_coefficient(coefficient),
            significant: is_significant(coefficient),
        }
    }

    /// Correlate two metrics of a snapshot
    pub fn between(snapshot: &HealthSnapshot, metric_a: MetricKind, metric_b: MetricKind) -> Self {
        let coefficient = correlate(
            snapshot.metric(metric_a).history(),
            snapshot.metric(metric_b).history(),
        );
        Self::from_coefficient(metric_a, metric_b, coefficient)
    }

    /// One-line insight message
    pub fn describe(&self) -> String {
        let a = self.metric_a.label();
        let b = self.metric_b.label().to_lowercase();

        if !self.significant {
            return format!(
                "No clear relationship between {} and {} (r = {:.2})",
                a, b, self.coefficient
            );
        }

        match self.direction {
            Direction::Positive => format!(
                "{} and {} tend to rise and fall together (r = {:.2})",
                a, b, self.coefficient
            ),
            Direction::Negative => format!(
                "{} tends to drop when {} rises (r = {:.2})",
                a, b, self.coefficient
            ),
        }
    }
}

/// Pairwise analysis over a selection of metrics
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Correlate every unordered pair of distinct selected metrics.
    ///
    /// Pairs follow selection order; repeated selections are ignored.
    pub fn pairwise(snapshot: &HealthSnapshot, selected: &[MetricKind]) -> Vec<CorrelationResult> {
        let mut metrics: Vec<MetricKind> = Vec::with_capacity(selected.len());
        for kind in selected {
            if !metrics.contains(kind) {
                metrics.push(*kind);
            }
        }

        let mut results = Vec::new();
        for (i, a) in metrics.iter().enumerate() {
            for b in &metrics[i + 1..] {
                let result = CorrelationResult::between(snapshot, *a, *b);
                debug!(
                    metric_a = %a,
                    metric_b = %b,
                    coefficient = result.coefficient,
                    significant = result.significant,
                    "correlated metric pair"
                );
                results.push(result);
            }
        }
        results
    }

    /// Significant pairs only
    pub fn insights(snapshot: &HealthSnapshot, selected: &[MetricKind]) -> Vec<CorrelationResult> {
        Self::pairwise(snapshot, selected)
            .into_iter()
            .filter(|r| r.significant)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SnapshotGenerator;
    use crate::types::tests::{day, series};
    use crate::types::DataPoint;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_identical_series() {
        let a = series(&[6.5, 7.0, 5.2, 8.1, 7.7, 4.9, 9.0]);
        assert!((correlate(&a, &a) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_inverse_series() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0];
        let negated: Vec<f64> = values.iter().map(|v| -v).collect();
        let r = correlate(&series(&values), &series(&negated));
        assert!((r + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_linear_transform_keeps_full_correlation() {
        let a = series(&[55.0, 61.0, 70.0, 88.0, 94.0]);
        let scaled: Vec<f64> = a.values().map(|v| 2.5 * v - 40.0).collect();
        assert!((correlate(&a, &series(&scaled)) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_constant_series_is_zero() {
        let constant = series(&[4.0; 7]);
        let other = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(correlate(&constant, &other), 0.0);
        assert_eq!(correlate(&other, &constant), 0.0);
        assert_eq!(correlate(&constant, &constant), 0.0);
    }

    #[test]
    fn test_inexact_constant_series_is_exactly_zero() {
        let other = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        for value in [0.1, 4.1, 4.4, 7.3, 71.2] {
            let constant = series(&[value; 7]);
            let r = correlate(&constant, &other);
            assert_eq!(r, 0.0, "constant {} gave {}", value, r);
            assert_eq!(correlate(&other, &constant), 0.0);

            let result = CorrelationResult::from_coefficient(MetricKind::Weight, MetricKind::Steps, r);
            assert_eq!(result.strength, 0.0);
            assert_eq!(result.direction, Direction::Negative);
            assert!(!result.significant);
        }

        for len in 3..30 {
            let constant = series(&vec![0.3; len]);
            let ramp: Vec<f64> = (0..len).map(|i| i as f64 * 1.7).collect();
            assert_eq!(correlate(&constant, &series(&ramp)), 0.0);
        }
    }

    #[test]
    fn test_too_few_common_dates() {
        let a = series(&[1.0, 2.0, 3.0, 4.0]);
        // Only day(2) and day(3) overlap
        let b = MetricSeries::new(vec![
            DataPoint::new(day(2), 10.0),
            DataPoint::new(day(3), 20.0),
            DataPoint::new(day(10), 30.0),
        ])
        .unwrap();
        assert_eq!(correlate(&a, &b), 0.0);
        assert_eq!(correlate(&a, &MetricSeries::default()), 0.0);
    }

    #[test]
    fn test_uses_only_common_dates() {
        let a = series(&[1.0, 2.0, 3.0, 100.0]);
        // Same trend on the first three days, diverging point on a date `a` lacks
        let b = MetricSeries::new(vec![
            DataPoint::new(day(0), 10.0),
            DataPoint::new(day(1), 20.0),
            DataPoint::new(day(2), 30.0),
            DataPoint::new(day(9), -500.0),
        ])
        .unwrap();
        assert!((correlate(&a, &b) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_known_coefficient() {
        // x = 1..5, y = [2, 4, 5, 4, 5] -> r = 6 / sqrt(10 * 6)
        let a = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = series(&[2.0, 4.0, 5.0, 4.0, 5.0]);
        let expected = 6.0 / (10.0_f64 * 6.0).sqrt();
        assert!((correlate(&a, &b) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_significance_classification() {
        assert!(is_significant(0.5));
        assert_eq!(Direction::from_coefficient(0.5), Direction::Positive);

        assert!(!is_significant(0.1));

        assert!(is_significant(-0.45));
        assert_eq!(Direction::from_coefficient(-0.45), Direction::Negative);

        assert!(!is_significant(0.3));
        assert!(!is_significant(-0.3));
        assert_eq!(Direction::from_coefficient(0.0), Direction::Negative);
    }

    #[test]
    fn test_result_fields() {
        let result = CorrelationResult::from_coefficient(MetricKind::Sleep, MetricKind::Mood, -0.45);
        assert_eq!(result.strength, 0.45);
        assert_eq!(result.direction, Direction::Negative);
        assert!(result.significant);
        assert_eq!(
            result.describe(),
            "Sleep tends to drop when mood rises (r = -0.45)"
        );

        let weak = CorrelationResult::from_coefficient(MetricKind::Water, MetricKind::HeartRate, 0.1);
        assert!(!weak.significant);
        assert!(weak.describe().starts_with("No clear relationship"));
    }

    #[test]
    fn test_pairwise_covers_each_unordered_pair_once() {
        let snapshot = SnapshotGenerator::from_seed(11)
            .generate_on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        let selected = [
            MetricKind::Sleep,
            MetricKind::Mood,
            MetricKind::Water,
            MetricKind::Sleep,
            MetricKind::HeartRate,
        ];

        let results = CorrelationAnalyzer::pairwise(&snapshot, &selected);
        let pairs: Vec<(MetricKind, MetricKind)> =
            results.iter().map(|r| (r.metric_a, r.metric_b)).collect();

        assert_eq!(
            pairs,
            vec![
                (MetricKind::Sleep, MetricKind::Mood),
                (MetricKind::Sleep, MetricKind::Water),
                (MetricKind::Sleep, MetricKind::HeartRate),
                (MetricKind::Mood, MetricKind::Water),
                (MetricKind::Mood, MetricKind::HeartRate),
                (MetricKind::Water, MetricKind::HeartRate),
            ]
        );

        for result in &results {
            let standalone = correlate(
                snapshot.metric(result.metric_a).history(),
                snapshot.metric(result.metric_b).history(),
            );
            assert_eq!(result.coefficient, standalone);
            assert!((-1.0..=1.0).contains(&result.coefficient));
        }
    }

    #[test]
    fn test_insights_keep_only_significant_pairs() {
        let snapshot = SnapshotGenerator::from_seed(5)
            .generate_on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        let all = CorrelationAnalyzer::pairwise(&snapshot, &MetricKind::ALL);
        let insights = CorrelationAnalyzer::insights(&snapshot, &MetricKind::ALL);

        assert_eq!(all.len(), 15);
        assert_eq!(
            insights.len(),
            all.iter().filter(|r| r.coefficient.abs() > 0.3).count()
        );
        assert!(insights.iter().all(|r| r.significant));
    }

    #[test]
    fn test_single_selection_has_no_pairs() {
        let snapshot = SnapshotGenerator::from_seed(5)
            .generate_on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert!(CorrelationAnalyzer::pairwise(&snapshot, &[MetricKind::Mood]).is_empty());
        assert!(CorrelationAnalyzer::pairwise(&snapshot, &[]).is_empty());
    }
}
