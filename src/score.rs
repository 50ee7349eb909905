//! Composite health score
//!
//! Five of the six metrics contribute up to [`SUB_SCORE_WEIGHT`] points each,
//! computed from current values only:
//!
//! - mood: `mood / 5`
//! - sleep: `min(sleep / 8, 1)`
//! - water: `water / goal`
//! - steps: `min(steps / goal, 1)`
//! - heart rate: `1 - |hr - 70| / 30`
//!
//! Weight does not contribute. Only sleep and steps are capped per metric, so
//! an over-goal water intake can add more than its share and a heart rate far
//! from 70 BPM subtracts points. The rounded total is clamped to 0-100.

use serde::{Deserialize, Serialize};

use crate::types::{HealthSnapshot, SnapshotMetrics};

/// Maximum nominal contribution of each metric
pub const SUB_SCORE_WEIGHT: f64 = 20.0;

/// Top of the mood scale
pub const MOOD_SCALE_MAX: f64 = 5.0;

/// Sleep duration that earns the full sleep contribution
pub const SLEEP_TARGET_HOURS: f64 = 8.0;

/// Resting heart rate that earns the full heart-rate contribution
pub const HEART_RATE_TARGET_BPM: f64 = 70.0;

/// Deviation from the target at which the heart-rate contribution reaches zero
pub const HEART_RATE_TOLERANCE_BPM: f64 = 30.0;

/// Raw values the score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub mood: f64,
    pub sleep_hours: f64,
    pub water_cups: f64,
    pub water_goal: f64,
    pub steps: f64,
    pub step_goal: f64,
    pub heart_rate_bpm: f64,
}

impl ScoreInputs {
    /// Take the current values of a snapshot's metrics
    pub fn from_metrics(metrics: &SnapshotMetrics) -> Self {
        Self {
            mood: metrics.mood.current(),
            sleep_hours: metrics.sleep.current(),
            water_cups: metrics.water.current(),
            water_goal: metrics.water.goal().unwrap_or(crate::config::DEFAULT_WATER_GOAL_CUPS),
            steps: metrics.steps.current(),
            step_goal: metrics.steps.goal().unwrap_or(crate::config::DEFAULT_STEP_GOAL),
            heart_rate_bpm: metrics.heart_rate.current(),
        }
    }
}

/// Per-metric contributions and the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub mood: f64,
    pub sleep: f64,
    pub water: f64,
    pub steps: f64,
    pub heart_rate: f64,
    /// Sum of contributions before rounding
    pub total: f64,
    /// Rounded (half up) and clamped to 0-100
    pub score: i32,
}

impl ScoreBreakdown {
    pub fn compute(inputs: &ScoreInputs) -> Self {
        let mood = (inputs.mood / MOOD_SCALE_MAX) * SUB_SCORE_WEIGHT;
        let sleep = (inputs.sleep_hours / SLEEP_TARGET_HOURS).min(1.0) * SUB_SCORE_WEIGHT;
        let water = ratio(inputs.water_cups, inputs.water_goal) * SUB_SCORE_WEIGHT;
        let steps = ratio(inputs.steps, inputs.step_goal).min(1.0) * SUB_SCORE_WEIGHT;
        let heart_rate = (1.0
            - (inputs.heart_rate_bpm - HEART_RATE_TARGET_BPM).abs() / HEART_RATE_TOLERANCE_BPM)
            * SUB_SCORE_WEIGHT;

        let total = mood + sleep + water + steps + heart_rate;
        let score = round_half_up(total).clamp(0.0, 100.0) as i32;

        Self {
            mood,
            sleep,
            water,
            steps,
            heart_rate,
            total,
            score,
        }
    }

    pub fn from_metrics(metrics: &SnapshotMetrics) -> Self {
        Self::compute(&ScoreInputs::from_metrics(metrics))
    }

    pub fn from_snapshot(snapshot: &HealthSnapshot) -> Self {
        Self::from_metrics(snapshot.metrics())
    }

    pub fn rating(&self) -> ScoreRating {
        ScoreRating::from_score(self.score)
    }
}

/// Compute the composite health score of a snapshot (0-100)
pub fn compute_health_score(snapshot: &HealthSnapshot) -> i32 {
    ScoreBreakdown::from_snapshot(snapshot).score
}

/// Qualitative band of a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreRating {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 80 => ScoreRating::Excellent,
            s if s >= 60 => ScoreRating::Good,
            s if s >= 40 => ScoreRating::Fair,
            _ => ScoreRating::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "Excellent",
            ScoreRating::Good => "Good",
            ScoreRating::Fair => "Fair",
            ScoreRating::Poor => "Poor",
        }
    }
}

/// `value / goal`, zero when the goal is not positive
fn ratio(value: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        value / goal
    } else {
        0.0
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::snapshot_with_currents;
    use pretty_assertions::assert_eq;

    fn inputs(mood: f64, sleep: f64, water: f64, steps: f64, hr: f64) -> ScoreInputs {
        ScoreInputs {
            mood,
            sleep_hours: sleep,
            water_cups: water,
            water_goal: 8.0,
            steps,
            step_goal: 10_000.0,
            heart_rate_bpm: hr,
        }
    }

    #[test]
    fn test_perfect_score() {
        let snapshot = snapshot_with_currents(5.0, 8.0, 8.0, 10_000.0, 70.0, 82.0);
        assert_eq!(compute_health_score(&snapshot), 100);

        // Sleep and steps are capped
        let snapshot = snapshot_with_currents(5.0, 9.5, 8.0, 14_000.0, 70.0, 60.0);
        assert_eq!(compute_health_score(&snapshot), 100);
    }

    #[test]
    fn test_minimal_score() {
        let snapshot = snapshot_with_currents(1.0, 0.0, 0.0, 0.0, 100.0, 70.0);
        let breakdown = ScoreBreakdown::from_snapshot(&snapshot);

        assert_eq!(breakdown.mood, 4.0);
        assert_eq!(breakdown.sleep, 0.0);
        assert_eq!(breakdown.water, 0.0);
        assert_eq!(breakdown.steps, 0.0);
        assert_eq!(breakdown.heart_rate, 0.0);
        assert_eq!(breakdown.score, 4);
        assert_eq!(snapshot.health_score(), 4);
    }

    #[test]
    fn test_weight_does_not_contribute() {
        let light = snapshot_with_currents(3.0, 7.0, 5.0, 6_000.0, 65.0, 50.0);
        let heavy = snapshot_with_currents(3.0, 7.0, 5.0, 6_000.0, 65.0, 120.0);
        assert_eq!(compute_health_score(&light), compute_health_score(&heavy));
    }

    #[test]
    fn test_typical_breakdown() {
        // 12 + 17.5 + 12.5 + 12 + 16.666.. = 70.666..
        let breakdown = ScoreBreakdown::compute(&inputs(3.0, 7.0, 5.0, 6_000.0, 65.0));
        assert!((breakdown.total - 70.666_666).abs() < 1e-3);
        assert_eq!(breakdown.score, 71);
        assert_eq!(breakdown.rating(), ScoreRating::Good);
    }

    #[test]
    fn test_rounds_half_up() {
        // water 1/8 -> 2.5, heart rate on target -> 20
        let breakdown = ScoreBreakdown::compute(&inputs(0.0, 0.0, 1.0, 0.0, 70.0));
        assert_eq!(breakdown.total, 22.5);
        assert_eq!(breakdown.score, 23);
    }

    #[test]
    fn test_heart_rate_penalty_is_unclamped() {
        // 40 BPM away from target: (1 - 40/30) * 20 = -6.67
        let breakdown = ScoreBreakdown::compute(&inputs(5.0, 8.0, 8.0, 10_000.0, 110.0));
        assert!(breakdown.heart_rate < 0.0);
        assert!((breakdown.heart_rate + 6.666_666).abs() < 1e-3);
        assert_eq!(breakdown.score, 73);
    }

    #[test]
    fn test_final_score_clamped() {
        let breakdown = ScoreBreakdown::compute(&inputs(0.0, 0.0, 0.0, 0.0, 200.0));
        assert!(breakdown.total < 0.0);
        assert_eq!(breakdown.score, 0);

        // Water over goal is not capped per metric
        let breakdown = ScoreBreakdown::compute(&inputs(5.0, 8.0, 16.0, 10_000.0, 70.0));
        assert_eq!(breakdown.water, 40.0);
        assert_eq!(breakdown.score, 100);
    }

    #[test]
    fn test_zero_goal_guarded() {
        let mut raw = inputs(5.0, 8.0, 8.0, 10_000.0, 70.0);
        raw.water_goal = 0.0;
        raw.step_goal = 0.0;
        let breakdown = ScoreBreakdown::compute(&raw);
        assert_eq!(breakdown.water, 0.0);
        assert_eq!(breakdown.steps, 0.0);
        assert_eq!(breakdown.score, 60);
    }

    #[test]
    fn test_deterministic() {
        let snapshot = snapshot_with_currents(4.0, 6.3, 3.0, 7_421.0, 81.0, 71.2);
        let first = compute_health_score(&snapshot);
        for _ in 0..10 {
            assert_eq!(compute_health_score(&snapshot), first);
        }
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(ScoreRating::from_score(100), ScoreRating::Excellent);
        assert_eq!(ScoreRating::from_score(80), ScoreRating::Excellent);
        assert_eq!(ScoreRating::from_score(79), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(60), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(40), ScoreRating::Fair);
        assert_eq!(ScoreRating::from_score(39), ScoreRating::Poor);
        assert_eq!(ScoreRating::from_score(0).label(), "Poor");
    }
}
