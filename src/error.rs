//! Error types for trace parsing, configuration, and diffing

use crate::diff::IdentityMismatch;
use crate::trace::{CostLineError, FunctionKey};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or parsing a trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cost line for `{key}` (header on line {line}): {reason}")]
    MalformedCost {
        line: usize,
        key: FunctionKey,
        #[source]
        reason: CostLineError,
    },
}

/// Errors raised while loading or validating a threshold configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("threshold_factor must be in [0, 1], got {0}")]
    ThresholdFactorOutOfRange(f64),

    #[error("min_threshold must be a finite non-negative number, got {0}")]
    InvalidMinThreshold(f64),
}

/// Errors raised while comparing two traces
#[derive(Error, Debug)]
pub enum DiffError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("traces are not comparable: {0}")]
    IdentityMismatch(#[from] IdentityMismatch),
}
