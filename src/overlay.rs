//! Overlay alignment for the multi-metric comparison chart

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{HealthSnapshot, MetricKind};

/// Metric whose dates define the rows of the comparison chart
pub const DEFAULT_OVERLAY_ANCHOR: MetricKind = MetricKind::Sleep;

/// Metrics offered for comparison
pub const OVERLAY_OPTIONS: [MetricKind; 4] = [
    MetricKind::Sleep,
    MetricKind::Mood,
    MetricKind::Water,
    MetricKind::HeartRate,
];

/// Initial selection of the comparison chart
pub const DEFAULT_OVERLAY_SELECTION: [MetricKind; 2] = [MetricKind::Sleep, MetricKind::Mood];

/// One chart row: the values each selected metric recorded on `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRow {
    pub date: NaiveDate,
    pub values: BTreeMap<MetricKind, f64>,
}

/// Align the selected metrics on the anchor metric's dates.
///
/// A metric with no entry on a row's date is left out of that row rather than
/// filled with zero.
pub fn align_overlay(
    snapshot: &HealthSnapshot,
    anchor: MetricKind,
    selected: &[MetricKind],
) -> Vec<OverlayRow> {
    snapshot
        .metric(anchor)
        .history()
        .dates()
        .map(|date| {
            let values = selected
                .iter()
                .filter_map(|kind| {
                    snapshot
                        .metric(*kind)
                        .history()
                        .value_on(date)
                        .map(|value| (*kind, value))
                })
                .collect();
            OverlayRow { date, values }
        })
        .collect()
}
