//! Goal progress for metrics tracked against a daily target

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::TrackedMetric;

/// Progress of the current value towards the goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current: f64,
    pub goal: f64,
    /// Share of the goal reached, capped at 100
    pub percent: f64,
}

/// Progress of a single day, uncapped so over-goal days stand out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub value: f64,
    /// Rounded share of the goal, may exceed 100
    pub percent: f64,
}

impl TrackedMetric {
    /// Progress towards the goal, for metrics that have one
    pub fn goal_progress(&self) -> Option<GoalProgress> {
        let goal = self.goal()?;
        Some(GoalProgress {
            current: self.current(),
            goal,
            percent: (self.current() / goal * 100.0).min(100.0),
        })
    }

    /// Per-day progress over the whole history, for metrics that have a goal
    pub fn daily_progress(&self) -> Vec<DailyProgress> {
        let Some(goal) = self.goal() else {
            return Vec::new();
        };

        self.history()
            .points()
            .iter()
            .map(|p| DailyProgress {
                date: p.date,
                value: p.value,
                percent: (p.value / goal * 100.0).round(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::types::tests::{day, metric};
    use crate::types::MetricKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_goal_progress_is_capped() {
        let water = metric(MetricKind::Water, &[3.0, 6.0]);
        let progress = water.goal_progress().unwrap();
        assert_eq!(progress.goal, 8.0);
        assert_eq!(progress.percent, 75.0);

        let steps = metric(MetricKind::Steps, &[12_500.0]);
        assert_eq!(steps.goal_progress().unwrap().percent, 100.0);
    }

    #[test]
    fn test_metrics_without_goal() {
        let mood = metric(MetricKind::Mood, &[4.0]);
        assert!(mood.goal_progress().is_none());
        assert!(mood.daily_progress().is_empty());
    }

    #[test]
    fn test_daily_progress_is_uncapped() {
        let steps = metric(MetricKind::Steps, &[4_321.0, 11_999.0]);
        let daily = steps.daily_progress();

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, day(0));
        assert_eq!(daily[0].percent, 43.0);
        assert_eq!(daily[1].percent, 120.0);
    }
}
