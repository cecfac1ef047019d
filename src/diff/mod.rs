// Significant-change detection between two traces
//
// Fixed thresholds flood the report whenever the whole program got uniformly
// faster or slower. Instead every per-function change is measured against
// the trace-wide change:
// - relative: the function must move more, in percent, than the whole trace
// - absolute: the function must move more than
//   max(min_threshold, threshold_factor * |trace-wide change|)
// and both must hold for self ms AND self hits.

mod config;
mod engine;
mod report;
mod statistics;

pub use config::{Aggregation, MismatchPolicy, ThresholdConfig};
pub use engine::{diff, is_significant, validate_same_source};
pub use report::{DiffRecord, DiffReport, FunctionCost, IdentityMismatch, SourceField};
pub use statistics::{adaptive_threshold, percentage_diff, signed_delta, DiffSummary};
