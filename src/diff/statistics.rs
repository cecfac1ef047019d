// Trace-wide drift and adaptive thresholds
//
// A function is judged against how much the whole trace moved: relative
// change must beat the global relative change, and absolute change must beat
// a floor that scales with the global absolute change.

use crate::diff::config::ThresholdConfig;
use crate::trace::TraceTotals;
use serde::Serialize;

/// Signed percentage change from `baseline` to `candidate`
///
/// Zero when the baseline is zero, whatever the candidate.
///
/// # Example
/// ```
/// use cgdiff::diff::percentage_diff;
///
/// assert_eq!(percentage_diff(10, 50), 400.0);
/// assert_eq!(percentage_diff(50, 10), -80.0);
/// assert_eq!(percentage_diff(0, 7), 0.0);
/// ```
pub fn percentage_diff(baseline: u64, candidate: u64) -> f64 {
    if baseline == 0 {
        return 0.0;
    }
    100.0 * (candidate as f64 - baseline as f64) / baseline as f64
}

/// Signed change from `baseline` to `candidate`, saturating at the i64 range
pub fn signed_delta(baseline: u64, candidate: u64) -> i64 {
    let delta = i128::from(candidate) - i128::from(baseline);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

/// `max(min_threshold, threshold_factor * |candidate - baseline|)`
pub fn adaptive_threshold(baseline: u64, candidate: u64, config: &ThresholdConfig) -> f64 {
    let drift = baseline.abs_diff(candidate) as f64;
    config.min_threshold.max(config.threshold_factor * drift)
}

/// Trace-wide numbers every per-function change is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffSummary {
    /// Total self ms of the baseline trace
    pub ms1: u64,
    /// Total self ms of the candidate trace
    pub ms2: u64,
    /// Total self hits of the baseline trace
    pub hits1: u64,
    /// Total self hits of the candidate trace
    pub hits2: u64,

    /// Signed trace-wide ms change, percent
    pub rel_ms_diff: f64,
    /// Signed trace-wide hits change, percent
    pub rel_hits_diff: f64,

    /// Absolute floor a function's ms change must exceed
    pub threshold_ms: f64,
    /// Absolute floor a function's hits change must exceed
    pub threshold_hits: f64,
}

impl DiffSummary {
    pub fn new(baseline: TraceTotals, candidate: TraceTotals, config: &ThresholdConfig) -> Self {
        Self {
            ms1: baseline.ms,
            ms2: candidate.ms,
            hits1: baseline.hits,
            hits2: candidate.hits,
            rel_ms_diff: percentage_diff(baseline.ms, candidate.ms),
            rel_hits_diff: percentage_diff(baseline.hits, candidate.hits),
            threshold_ms: adaptive_threshold(baseline.ms, candidate.ms, config),
            threshold_hits: adaptive_threshold(baseline.hits, candidate.hits, config),
        }
    }

    pub fn ms_delta(&self) -> i64 {
        signed_delta(self.ms1, self.ms2)
    }

    pub fn hits_delta(&self) -> i64 {
        signed_delta(self.hits1, self.hits2)
    }
}
