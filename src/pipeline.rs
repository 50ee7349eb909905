//! Stateless API
//!
//! Entry points for presentation layers that work with snapshots as JSON:
//! generate, score and correlate without holding a session store.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::correlation::{CorrelationAnalyzer, CorrelationResult};
use crate::error::ComputeError;
use crate::generator::SnapshotGenerator;
use crate::progress::{DailyProgress, GoalProgress};
use crate::score::{ScoreBreakdown, ScoreRating};
use crate::trend::{SeriesTrend, DEFAULT_MOVING_AVERAGE_WINDOW};
use crate::types::{HealthSnapshot, MetricKind, MoodLevel};

/// Generate a snapshot for today with the default configuration and an
/// entropy-seeded random source.
pub fn generate_snapshot() -> HealthSnapshot {
    SnapshotGenerator::from_entropy().generate()
}

/// Generate a snapshot for today with `config`, reproducibly when `seed` is given
pub fn generate_snapshot_with(
    config: GeneratorConfig,
    seed: Option<u64>,
) -> Result<HealthSnapshot, ComputeError> {
    Ok(SnapshotGenerator::seeded(config, seed)?.generate())
}

pub fn snapshot_to_json(snapshot: &HealthSnapshot) -> Result<String, ComputeError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse and validate a snapshot; the health score is recomputed
pub fn snapshot_from_json(json: &str) -> Result<HealthSnapshot, ComputeError> {
    Ok(serde_json::from_str(json)?)
}

/// Health score with its breakdown and goal progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub health_score: i32,
    pub rating: ScoreRating,
    pub breakdown: ScoreBreakdown,
    pub water_progress: Option<GoalProgress>,
    pub step_progress: Option<GoalProgress>,
}

pub fn score_report(snapshot: &HealthSnapshot) -> ScoreReport {
    let breakdown = ScoreBreakdown::from_snapshot(snapshot);
    debug!(
        snapshot_id = %snapshot.id(),
        total = breakdown.total,
        score = breakdown.score,
        "scored health snapshot"
    );
    ScoreReport {
        health_score: breakdown.score,
        rating: breakdown.rating(),
        breakdown,
        water_progress: snapshot.metric(MetricKind::Water).goal_progress(),
        step_progress: snapshot.metric(MetricKind::Steps).goal_progress(),
    }
}

/// Parse metric names (`sleep`, `heartRate`, `Heart Rate`, ...)
pub fn parse_metrics<S: AsRef<str>>(names: &[S]) -> Result<Vec<MetricKind>, ComputeError> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

/// Correlate every pair of the named metrics of a JSON snapshot.
///
/// All pairs are returned; use [`CorrelationResult::significant`] to pick insights.
pub fn insights_from_json<S: AsRef<str>>(
    snapshot_json: &str,
    metric_names: &[S],
) -> Result<Vec<CorrelationResult>, ComputeError> {
    let snapshot = snapshot_from_json(snapshot_json)?;
    let metrics = parse_metrics(metric_names)?;
    Ok(CorrelationAnalyzer::pairwise(&snapshot, &metrics))
}

/// Everything a metric card shows for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub kind: MetricKind,
    pub label: String,
    pub unit: String,
    pub current: f64,
    pub goal_progress: Option<GoalProgress>,
    /// Empty for metrics without a goal
    pub daily_progress: Vec<DailyProgress>,
    /// Only set for mood
    pub mood_level: Option<MoodLevel>,
    pub trend: Option<SeriesTrend>,
}

/// Per-metric summaries in snapshot order
pub fn metric_summaries(snapshot: &HealthSnapshot) -> Vec<MetricSummary> {
    snapshot
        .metrics()
        .iter()
        .map(|metric| {
            let kind = metric.kind();
            MetricSummary {
                kind,
                label: kind.label().to_string(),
                unit: kind.unit().to_string(),
                current: metric.current(),
                goal_progress: metric.goal_progress(),
                daily_progress: metric.daily_progress(),
                mood_level: match kind {
                    MetricKind::Mood => MoodLevel::from_value(metric.current()),
                    _ => None,
                },
                trend: SeriesTrend::from_series(metric.history(), DEFAULT_MOVING_AVERAGE_WINDOW),
            }
        })
        .collect()
}

/// Per-metric summaries of a JSON snapshot
pub fn summaries_from_json(snapshot_json: &str) -> Result<Vec<MetricSummary>, ComputeError> {
    let snapshot = snapshot_from_json(snapshot_json)?;
    Ok(metric_summaries(&snapshot))
}
