//! Metric history generation
//!
//! Produces complete [`HealthSnapshot`]s from an injectable random source:
//! one window of contiguous daily values per metric, ending today, each value
//! drawn independently within the metric's domain.

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use uuid::Uuid;

use crate::config::GeneratorConfig;
use crate::error::ComputeError;
use crate::types::{DataPoint, HealthSnapshot, MetricKind, MetricSeries, SnapshotMetrics, TrackedMetric};

const MOOD_RANGE: RangeInclusive<u32> = 1..=5;
const SLEEP_MIN_HOURS: f64 = 4.0;
const SLEEP_MAX_HOURS: f64 = 10.0;
const WATER_RANGE: RangeInclusive<u32> = 2..=8;
const STEPS_RANGE: RangeInclusive<u32> = 3_000..=11_999;
const HEART_RATE_RANGE: RangeInclusive<u32> = 55..=94;

/// Inclusive bounds a generated value of `kind` always falls within
pub fn value_domain(kind: MetricKind, config: &GeneratorConfig) -> RangeInclusive<f64> {
    let widen = |r: RangeInclusive<u32>| f64::from(*r.start())..=f64::from(*r.end());
    match kind {
        MetricKind::Mood => widen(MOOD_RANGE),
        MetricKind::Sleep => SLEEP_MIN_HOURS..=SLEEP_MAX_HOURS,
        MetricKind::Water => widen(WATER_RANGE),
        MetricKind::Steps => widen(STEPS_RANGE),
        MetricKind::HeartRate => widen(HEART_RATE_RANGE),
        MetricKind::Weight => {
            round_to_tenth(config.base_weight_kg - config.weight_spread_kg)
                ..=round_to_tenth(config.base_weight_kg + config.weight_spread_kg)
        }
    }
}

/// Contiguous dates ending on `today`, oldest first
pub fn window_dates(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days)
        .map(|i| today - Duration::days((days - 1 - i) as i64))
        .collect()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Snapshot generator over a seedable random source
pub struct SnapshotGenerator<R = ChaCha8Rng> {
    config: GeneratorConfig,
    rng: R,
}

impl SnapshotGenerator<ChaCha8Rng> {
    /// Reproducible generator with the default configuration
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy with the default configuration
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Generator for `config`, seeded when `seed` is given, from entropy otherwise
    pub fn seeded(config: GeneratorConfig, seed: Option<u64>) -> Result<Self, ComputeError> {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_config(config, rng)
    }
}

impl<R: Rng> SnapshotGenerator<R> {
    /// Create a generator with the default configuration
    pub fn new(rng: R) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng,
        }
    }

    /// Create a generator with a validated configuration
    pub fn with_config(config: GeneratorConfig, rng: R) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a snapshot whose window ends on the current UTC date
    pub fn generate(&mut self) -> HealthSnapshot {
        self.generate_on(Utc::now().date_naive())
    }

    /// Generate a snapshot whose window ends on `today`
    pub fn generate_on(&mut self, today: NaiveDate) -> HealthSnapshot {
        let dates = window_dates(today, self.config.window_days);
        let water_goal = self.config.water_goal_cups;
        let step_goal = self.config.step_goal;

        // Each metric draws its whole window before the next one starts.
        let mood = self.draw_series(&dates, |rng, _| f64::from(rng.gen_range(MOOD_RANGE)));
        let sleep = self.draw_series(&dates, |rng, _| {
            round_to_tenth(rng.gen_range(SLEEP_MIN_HOURS..SLEEP_MAX_HOURS))
        });
        let water = self.draw_series(&dates, |rng, _| f64::from(rng.gen_range(WATER_RANGE)));
        let steps = self.draw_series(&dates, |rng, _| f64::from(rng.gen_range(STEPS_RANGE)));
        let heart_rate =
            self.draw_series(&dates, |rng, _| f64::from(rng.gen_range(HEART_RATE_RANGE)));
        let weight = self.draw_series(&dates, |rng, config| {
            let offset = (rng.gen::<f64>() * 2.0 - 1.0) * config.weight_spread_kg;
            round_to_tenth(config.base_weight_kg + offset)
        });

        let metrics = SnapshotMetrics {
            mood: TrackedMetric::from_generated(MetricKind::Mood, mood, None),
            sleep: TrackedMetric::from_generated(MetricKind::Sleep, sleep, None),
            water: TrackedMetric::from_generated(MetricKind::Water, water, Some(water_goal)),
            steps: TrackedMetric::from_generated(MetricKind::Steps, steps, Some(step_goal)),
            heart_rate: TrackedMetric::from_generated(MetricKind::HeartRate, heart_rate, None),
            weight: TrackedMetric::from_generated(MetricKind::Weight, weight, None),
        };

        let snapshot = HealthSnapshot::assemble(Uuid::new_v4(), Utc::now(), metrics);

        debug!(
            snapshot_id = %snapshot.id(),
            %today,
            window_days = self.config.window_days,
            health_score = snapshot.health_score(),
            "generated health snapshot"
        );

        snapshot
    }

    fn draw_series<F>(&mut self, dates: &[NaiveDate], mut draw: F) -> MetricSeries
    where
        F: FnMut(&mut R, &GeneratorConfig) -> f64,
    {
        let points = dates
            .iter()
            .map(|date| DataPoint::new(*date, draw(&mut self.rng, &self.config)))
            .collect();
        MetricSeries::from_sorted(points)
    }
}
