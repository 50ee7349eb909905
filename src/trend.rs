//! Series trend summaries
//!
//! Trailing moving average and change figures for a daily series, as shown
//! on the weight card.

use serde::{Deserialize, Serialize};

use crate::types::{DataPoint, MetricSeries};

/// Default number of points in the trailing moving average
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 3;

/// Direction of the overall change of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Trend summary of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTrend {
    /// Trailing average per point, rounded to one decimal
    pub moving_average: Vec<DataPoint>,
    /// Last value minus first value
    pub total_change: f64,
    /// Total change relative to the first value, in percent
    pub percent_change: Option<f64>,
    /// Last value minus the one before it
    pub last_change: f64,
    pub direction: TrendDirection,
}

impl SeriesTrend {
    /// Summarise a series; `None` for an empty series.
    ///
    /// Each moving-average point covers itself and up to `window - 1`
    /// predecessors. A window of 0 is treated as 1.
    pub fn from_series(series: &MetricSeries, window: usize) -> Option<Self> {
        let first = series.first()?.value;
        let last = series.last()?.value;
        let window = window.max(1);
        let points = series.points();

        let moving_average = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let slice = &points[(i + 1).saturating_sub(window)..=i];
                let avg = slice.iter().map(|q| q.value).sum::<f64>() / slice.len() as f64;
                DataPoint::new(p.date, (avg * 10.0).round() / 10.0)
            })
            .collect();

        let total_change = last - first;
        let percent_change = if first != 0.0 {
            Some(total_change / first * 100.0)
        } else {
            None
        };
        let last_change = match points.len() {
            0 | 1 => total_change,
            n => last - points[n - 2].value,
        };
        let direction = if total_change > 0.0 {
            TrendDirection::Up
        } else if total_change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        };

        Some(Self {
            moving_average,
            total_change,
            percent_change,
            last_change,
            direction,
        })
    }
}
