// Configuration for significance thresholds
//
// Passed explicitly into the differ. Defaults are compiled in and can be
// replaced by a TOML file and then by command-line overrides.

use crate::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How repeated occurrences of one key are combined before diffing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Compare the first occurrence of each key (totals still count all)
    #[default]
    First,
    /// Compare the sum over all occurrences of each key
    Sum,
}

/// What to do when a matched key disagrees on name/file/line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Log a warning, record the mismatch and skip the key
    #[default]
    Warn,
    /// Abort the comparison
    Fail,
}

/// Configuration for significance detection
///
/// A function is reported only when its change clears an absolute floor
/// that grows with the trace-wide change:
/// `max(min_threshold, threshold_factor * |total2 - total1|)`.
///
/// # Example
/// ```
/// use cgdiff::diff::ThresholdConfig;
///
/// let config = ThresholdConfig::default();
/// assert_eq!(config.threshold_factor, 0.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Fraction of the trace-wide absolute change used as the noise floor
    ///
    /// - 0.0: the floor is always `min_threshold`
    /// - 0.1 (default): a function must move by more than a tenth of what
    ///   the whole trace moved
    /// - 1.0: a function must move more than the whole trace did
    pub threshold_factor: f64,

    /// Absolute floor, in cost units (ms or hits)
    ///
    /// Default: 10
    pub min_threshold: f64,

    /// Per-key aggregation before diffing
    ///
    /// Default: first occurrence
    pub aggregation: Aggregation,

    /// Handling of name/file/line disagreement between traces
    ///
    /// Default: warn and skip
    pub on_mismatch: MismatchPolicy,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold_factor: 0.1,
            min_threshold: 10.0,
            aggregation: Aggregation::First,
            on_mismatch: MismatchPolicy::Warn,
        }
    }
}

impl ThresholdConfig {
    /// Report fewer, larger changes
    pub fn conservative() -> Self {
        Self {
            threshold_factor: 0.25,
            min_threshold: 50.0,
            ..Self::default()
        }
    }

    /// Report smaller changes too
    pub fn sensitive() -> Self {
        Self {
            threshold_factor: 0.01,
            min_threshold: 1.0,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    ///
    /// Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ThresholdConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        tracing::debug!("Loaded threshold config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold_factor) {
            return Err(ConfigError::ThresholdFactorOutOfRange(self.threshold_factor));
        }

        if !self.min_threshold.is_finite() || self.min_threshold < 0.0 {
            return Err(ConfigError::InvalidMinThreshold(self.min_threshold));
        }

        Ok(())
    }
}
