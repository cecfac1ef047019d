//! CLI argument parsing for cgdiff

use crate::diff::{Aggregation, MismatchPolicy, ThresholdConfig};
use crate::error::ConfigError;
use crate::trace::ParseOptions;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Output format for summaries and comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// What a run does, decided by the number of traces given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Print totals of one trace
    Summary { trace: &'a Path },
    /// Compare a candidate trace against a baseline
    Diff {
        baseline: &'a Path,
        candidate: &'a Path,
    },
}

#[derive(Parser, Debug)]
#[command(name = "cgdiff")]
#[command(version)]
#[command(
    about = "Summarize a callgrind profile, or report functions whose self cost changed significantly between two",
    long_about = None
)]
pub struct Cli {
    /// Trace to summarize, or the baseline when CANDIDATE is given
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Trace to compare against TRACE
    #[arg(value_name = "CANDIDATE")]
    pub candidate: Option<PathBuf>,

    /// TOML file with threshold_factor, min_threshold, aggregation, on_mismatch
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fraction of the trace-wide change a function must exceed (overrides config)
    #[arg(long = "threshold-factor", value_name = "FACTOR")]
    pub threshold_factor: Option<f64>,

    /// Absolute change floor in cost units (overrides config)
    #[arg(long = "min-threshold", value_name = "COST")]
    pub min_threshold: Option<f64>,

    /// How repeated occurrences of a function are combined before comparing
    #[arg(long = "aggregate", value_enum, value_name = "MODE")]
    pub aggregation: Option<Aggregation>,

    /// Fail on malformed cost lines and on functions whose source location differs
    #[arg(long = "strict")]
    pub strict: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log parse and comparison details to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Summary for one trace, comparison for two
    pub fn mode(&self) -> Mode<'_> {
        match &self.candidate {
            None => Mode::Summary { trace: &self.trace },
            Some(candidate) => Mode::Diff {
                baseline: &self.trace,
                candidate,
            },
        }
    }

    /// Parse options for the current mode
    pub fn parse_options(&self) -> ParseOptions {
        let options = match self.candidate {
            None => ParseOptions::summary(),
            Some(_) => ParseOptions::diff(),
        };
        options.with_strict(self.strict)
    }

    /// Threshold configuration: defaults, then `--config`, then flags
    pub fn threshold_config(&self) -> Result<ThresholdConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ThresholdConfig::from_file(path)?,
            None => ThresholdConfig::default(),
        };

        if let Some(factor) = self.threshold_factor {
            config.threshold_factor = factor;
        }
        if let Some(min) = self.min_threshold {
            config.min_threshold = min;
        }
        if let Some(aggregation) = self.aggregation {
            config.aggregation = aggregation;
        }
        if self.strict {
            config.on_mismatch = MismatchPolicy::Fail;
        }

        config.validate()?;
        Ok(config)
    }
}
