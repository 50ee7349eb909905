//! Error types for Vitals

use thiserror::Error;

use crate::types::MetricKind;

/// Errors that can occur at the fallible edges of the data model.
///
/// The core computations (generation, scoring, correlation) are total and never
/// return these; they surface only when building model values from untrusted
/// input, validating configuration, or contending on the session store.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid metric {kind}: {reason}")]
    InvalidMetric { kind: MetricKind, reason: String },

    #[error("Metric slot mismatch: expected {expected}, found {found}")]
    MetricMismatch {
        expected: MetricKind,
        found: MetricKind,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("A sync is already in progress")]
    SyncInProgress,
}
