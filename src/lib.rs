//! Vitals - Data model for health-tracking dashboards
//!
//! Vitals generates mock daily metric histories (mood, sleep, water, steps,
//! heart rate, weight), derives a composite health score from the latest
//! values, and correlates metric histories to produce cross-metric insights.
//!
//! ## Modules
//!
//! - **Generation**: seedable snapshot generator and the session store that
//!   swaps snapshots on sync
//! - **Scoring**: composite 0-100 health score with per-metric breakdown
//! - **Analysis**: pairwise Pearson correlation, goal progress, series trends
//!   and overlay alignment

pub mod config;
pub mod correlation;
pub mod error;
pub mod generator;
pub mod overlay;
pub mod pipeline;
pub mod progress;
pub mod score;
pub mod store;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::GeneratorConfig;
pub use correlation::{correlate, is_significant, CorrelationAnalyzer, CorrelationResult, Direction};
pub use error::ComputeError;
pub use generator::SnapshotGenerator;
pub use pipeline::{
    generate_snapshot, generate_snapshot_with, metric_summaries, score_report, MetricSummary,
    ScoreReport,
};
pub use score::{compute_health_score, ScoreBreakdown, ScoreRating};
pub use store::SnapshotStore;
pub use types::{DataPoint, HealthSnapshot, MetricKind, MetricSeries, MoodLevel, TrackedMetric};

/// Vitals version embedded in CLI and FFI output
pub const VITALS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "vitals-core";
