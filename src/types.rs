//! Core types for the Vitals data model
//!
//! This module defines the values that flow between the generator, the score
//! calculator and the correlation analyzer: metric identities, daily series,
//! tracked metrics and the immutable health snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ComputeError;

/// Identifier of one of the six tracked metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Mood,
    Sleep,
    Water,
    Steps,
    HeartRate,
    Weight,
}

impl MetricKind {
    /// All metrics, in snapshot order
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Mood,
        MetricKind::Sleep,
        MetricKind::Water,
        MetricKind::Steps,
        MetricKind::HeartRate,
        MetricKind::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Mood => "mood",
            MetricKind::Sleep => "sleep",
            MetricKind::Water => "water",
            MetricKind::Steps => "steps",
            MetricKind::HeartRate => "heart_rate",
            MetricKind::Weight => "weight",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Mood => "Mood",
            MetricKind::Sleep => "Sleep",
            MetricKind::Water => "Water",
            MetricKind::Steps => "Steps",
            MetricKind::HeartRate => "Heart Rate",
            MetricKind::Weight => "Weight",
        }
    }

    /// Display unit (empty for the ordinal mood scale)
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Mood => "",
            MetricKind::Sleep => "hours",
            MetricKind::Water => "cups",
            MetricKind::Steps => "steps",
            MetricKind::HeartRate => "BPM",
            MetricKind::Weight => "kg",
        }
    }

    /// Whether this metric is tracked against a daily goal
    pub fn has_goal(&self) -> bool {
        matches!(self, MetricKind::Water | MetricKind::Steps)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ComputeError;

    /// Accepts `heart_rate`, `heartRate` and `Heart Rate` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "mood" => Ok(MetricKind::Mood),
            "sleep" => Ok(MetricKind::Sleep),
            "water" => Ok(MetricKind::Water),
            "steps" | "step" => Ok(MetricKind::Steps),
            "heartrate" | "hr" => Ok(MetricKind::HeartRate),
            "weight" => Ok(MetricKind::Weight),
            _ => Err(ComputeError::UnknownMetric(s.to_string())),
        }
    }
}

/// Ordinal mood level on the 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl MoodLevel {
    /// Map a mood value to its level. Non-integer or out-of-scale values have no level.
    pub fn from_value(value: f64) -> Option<Self> {
        if value.fract() != 0.0 {
            return None;
        }
        match value as i64 {
            1 => Some(MoodLevel::VerySad),
            2 => Some(MoodLevel::Sad),
            3 => Some(MoodLevel::Neutral),
            4 => Some(MoodLevel::Happy),
            5 => Some(MoodLevel::VeryHappy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::VerySad => "Very sad",
            MoodLevel::Sad => "Sad",
            MoodLevel::Neutral => "Neutral",
            MoodLevel::Happy => "Happy",
            MoodLevel::VeryHappy => "Very happy",
        }
    }
}

/// A single daily observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered daily history of one metric.
///
/// Dates are strictly ascending (no duplicates) and values are finite.
/// Generated series are additionally contiguous, see [`MetricSeries::is_contiguous`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DataPoint>", into = "Vec<DataPoint>")]
pub struct MetricSeries {
    points: Vec<DataPoint>,
}

impl MetricSeries {
    /// Build a series from points, validating ordering and values
    pub fn new(points: Vec<DataPoint>) -> Result<Self, ComputeError> {
        if let Some(point) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(ComputeError::InvalidSeries(format!(
                "non-finite value on {}",
                point.date
            )));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ComputeError::InvalidSeries(format!(
                "dates must be strictly ascending ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self { points })
    }

    /// Build a series the caller already knows to be ordered
    pub(crate) fn from_sorted(points: Vec<DataPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Value recorded on `date`, if any
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    /// True when every date is the calendar day after its predecessor
    pub fn is_contiguous(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].date.succ_opt() == Some(w[1].date))
    }
}

impl TryFrom<Vec<DataPoint>> for MetricSeries {
    type Error = ComputeError;

    fn try_from(points: Vec<DataPoint>) -> Result<Self, Self::Error> {
        MetricSeries::new(points)
    }
}

impl From<MetricSeries> for Vec<DataPoint> {
    fn from(series: MetricSeries) -> Self {
        series.points
    }
}

/// One tracked metric: its history, current value and optional goal.
///
/// The current value is always the latest history value; both are set together
/// at construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackedMetricRecord")]
pub struct TrackedMetric {
    kind: MetricKind,
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<f64>,
    history: MetricSeries,
}

impl TrackedMetric {
    /// Create a tracked metric from its history.
    ///
    /// Water and steps require a positive goal; the other metrics must not have one.
    pub fn new(
        kind: MetricKind,
        history: MetricSeries,
        goal: Option<f64>,
    ) -> Result<Self, ComputeError> {
        let value = match history.last() {
            Some(point) => point.value,
            None => {
                return Err(ComputeError::InvalidMetric {
                    kind,
                    reason: "history is empty".to_string(),
                })
            }
        };

        match (kind.has_goal(), goal) {
            (true, Some(g)) if g.is_finite() && g > 0.0 => {}
            (true, Some(g)) => {
                return Err(ComputeError::InvalidMetric {
                    kind,
                    reason: format!("goal must be positive, got {}", g),
                })
            }
            (true, None) => {
                return Err(ComputeError::InvalidMetric {
                    kind,
                    reason: "goal is required".to_string(),
                })
            }
            (false, Some(_)) => {
                return Err(ComputeError::InvalidMetric {
                    kind,
                    reason: "metric does not take a goal".to_string(),
                })
            }
            (false, None) => {}
        }

        Ok(Self {
            kind,
            value,
            goal,
            history,
        })
    }

    /// Assemble a metric from generator output (non-empty history, goal per kind)
    pub(crate) fn from_generated(kind: MetricKind, history: MetricSeries, goal: Option<f64>) -> Self {
        let value = history.last().map(|p| p.value).unwrap_or_default();
        Self {
            kind,
            value,
            goal,
            history,
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Current value (latest history entry)
    pub fn current(&self) -> f64 {
        self.value
    }

    pub fn goal(&self) -> Option<f64> {
        self.goal
    }

    pub fn history(&self) -> &MetricSeries {
        &self.history
    }
}

#[derive(Deserialize)]
struct TrackedMetricRecord {
    kind: MetricKind,
    value: f64,
    #[serde(default)]
    goal: Option<f64>,
    history: MetricSeries,
}

impl TryFrom<TrackedMetricRecord> for TrackedMetric {
    type Error = ComputeError;

    fn try_from(record: TrackedMetricRecord) -> Result<Self, Self::Error> {
        let metric = TrackedMetric::new(record.kind, record.history, record.goal)?;
        if (metric.value - record.value).abs() > f64::EPSILON {
            return Err(ComputeError::InvalidMetric {
                kind: metric.kind,
                reason: format!(
                    "current value {} does not match latest history value {}",
                    record.value, metric.value
                ),
            });
        }
        Ok(metric)
    }
}

/// The six tracked metrics of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    pub mood: TrackedMetric,
    pub sleep: TrackedMetric,
    pub water: TrackedMetric,
    pub steps: TrackedMetric,
    pub heart_rate: TrackedMetric,
    pub weight: TrackedMetric,
}

impl SnapshotMetrics {
    pub fn get(&self, kind: MetricKind) -> &TrackedMetric {
        match kind {
            MetricKind::Mood => &self.mood,
            MetricKind::Sleep => &self.sleep,
            MetricKind::Water => &self.water,
            MetricKind::Steps => &self.steps,
            MetricKind::HeartRate => &self.heart_rate,
            MetricKind::Weight => &self.weight,
        }
    }

    /// Metrics in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedMetric> {
        MetricKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    /// Check that every slot holds the metric it is named after
    pub fn validate(&self) -> Result<(), ComputeError> {
        for expected in MetricKind::ALL {
            let found = self.get(expected).kind();
            if found != expected {
                return Err(ComputeError::MetricMismatch { expected, found });
            }
        }
        Ok(())
    }
}

/// Immutable aggregate of all tracked metrics plus the derived health score.
///
/// A sync never mutates a snapshot; it produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct HealthSnapshot {
    id: Uuid,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    metrics: SnapshotMetrics,
    health_score: i32,
}

impl HealthSnapshot {
    /// Create a snapshot with fresh provenance
    pub fn new(metrics: SnapshotMetrics) -> Result<Self, ComputeError> {
        Self::with_provenance(Uuid::new_v4(), Utc::now(), metrics)
    }

    /// Create a snapshot with explicit provenance
    pub fn with_provenance(
        id: Uuid,
        generated_at: DateTime<Utc>,
        metrics: SnapshotMetrics,
    ) -> Result<Self, ComputeError> {
        metrics.validate()?;
        Ok(Self::assemble(id, generated_at, metrics))
    }

    pub(crate) fn assemble(id: Uuid, generated_at: DateTime<Utc>, metrics: SnapshotMetrics) -> Self {
        let health_score = crate::score::ScoreBreakdown::from_metrics(&metrics).score;
        Self {
            id,
            generated_at,
            metrics,
            health_score,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn metrics(&self) -> &SnapshotMetrics {
        &self.metrics
    }

    pub fn metric(&self, kind: MetricKind) -> &TrackedMetric {
        self.metrics.get(kind)
    }

    /// Composite health score (0-100)
    pub fn health_score(&self) -> i32 {
        self.health_score
    }

    /// Latest date covered by the snapshot
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.metrics.iter().filter_map(|m| m.history().last()).map(|p| p.date).max()
    }
}

/// Wire form of a snapshot; the health score is always recomputed on load
#[derive(Deserialize)]
struct SnapshotRecord {
    id: Uuid,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    metrics: SnapshotMetrics,
}

impl TryFrom<SnapshotRecord> for HealthSnapshot {
    type Error = ComputeError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        HealthSnapshot::with_provenance(record.id, record.generated_at, record.metrics)
    }
}
