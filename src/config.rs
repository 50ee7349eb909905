//! Generator configuration
//!
//! Session-wide knobs for snapshot generation. The value domains of the
//! metrics are fixed; only the window length, the goals and the weight baseline
//! are configurable.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Default number of daily points per series
pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Longest supported window (one leap year)
pub const MAX_WINDOW_DAYS: usize = 366;

/// Default daily water goal in cups
pub const DEFAULT_WATER_GOAL_CUPS: f64 = 8.0;

/// Default daily step goal
pub const DEFAULT_STEP_GOAL: f64 = 10_000.0;

/// Default weight baseline in kg
pub const DEFAULT_BASE_WEIGHT_KG: f64 = 70.0;

/// Default maximum deviation from the weight baseline in kg
pub const DEFAULT_WEIGHT_SPREAD_KG: f64 = 5.0;

/// Configuration for [`crate::generator::SnapshotGenerator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of contiguous days per series, ending today
    pub window_days: usize,
    /// Water goal (cups)
    pub water_goal_cups: f64,
    /// Step goal
    pub step_goal: f64,
    /// Weight baseline (kg)
    pub base_weight_kg: f64,
    /// Weight values fall within baseline ± spread (kg)
    pub weight_spread_kg: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            water_goal_cups: DEFAULT_WATER_GOAL_CUPS,
            step_goal: DEFAULT_STEP_GOAL,
            base_weight_kg: DEFAULT_BASE_WEIGHT_KG,
            weight_spread_kg: DEFAULT_WEIGHT_SPREAD_KG,
        }
    }
}

impl GeneratorConfig {
    /// Create a default configuration with a custom window length
    pub fn with_window_days(window_days: usize) -> Self {
        Self {
            window_days,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(ComputeError::InvalidConfig(format!(
                "window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.window_days
            )));
        }

        for (name, goal) in [
            ("water_goal_cups", self.water_goal_cups),
            ("step_goal", self.step_goal),
        ] {
            if !goal.is_finite() || goal <= 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, goal
                )));
            }
        }

        if !self.base_weight_kg.is_finite() {
            return Err(ComputeError::InvalidConfig(
                "base_weight_kg must be finite".to_string(),
            ));
        }

        if !self.weight_spread_kg.is_finite() || self.weight_spread_kg < 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "weight_spread_kg must be a non-negative number, got {}",
                self.weight_spread_kg
            )));
        }

        if self.base_weight_kg - self.weight_spread_kg <= 0.0 {
            return Err(ComputeError::InvalidConfig(
                "base_weight_kg - weight_spread_kg must stay above zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_days, 7);
        assert_eq!(config.water_goal_cups, 8.0);
        assert_eq!(config.step_goal, 10_000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GeneratorConfig::from_json(r#"{"window_days": 14}"#).unwrap();
        assert_eq!(
            config,
            GeneratorConfig {
                window_days: 14,
                ..GeneratorConfig::default()
            }
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(GeneratorConfig::with_window_days(0).validate().is_err());
        assert!(GeneratorConfig::with_window_days(MAX_WINDOW_DAYS + 1)
            .validate()
            .is_err());

        let config = GeneratorConfig {
            step_goal: 0.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ComputeError::InvalidConfig(_))
        ));

        let config = GeneratorConfig {
            weight_spread_kg: -1.0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            base_weight_kg: 4.0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GeneratorConfig::with_window_days(30);
        let json = config.to_json().unwrap();
        assert_eq!(GeneratorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GeneratorConfig::from_json("not json"),
            Err(ComputeError::JsonError(_))
        ));
    }
}
