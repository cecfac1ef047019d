// Comparison results

use crate::diff::statistics::{percentage_diff, signed_delta, DiffSummary};
use crate::trace::FunctionKey;
use serde::Serialize;
use std::fmt;

/// Cost of one function in one trace after per-key aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionCost<'a> {
    pub name: &'a str,
    pub file: &'a str,
    pub line: &'a str,
    pub self_ms: u64,
    pub self_hits: u64,
}

/// One function whose change passed the significance test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub name: String,
    pub file: String,
    pub line: String,
    /// Candidate minus baseline self ms
    pub self_ms_diff: i64,
    /// Candidate minus baseline self hits
    pub self_hits_diff: i64,
    pub ms1: u64,
    pub ms2: u64,
    pub hits1: u64,
    pub hits2: u64,
}

impl DiffRecord {
    /// Build from the baseline and candidate cost; identity is the baseline's
    pub fn new(baseline: &FunctionCost<'_>, candidate: &FunctionCost<'_>) -> Self {
        Self {
            name: baseline.name.to_string(),
            file: baseline.file.to_string(),
            line: baseline.line.to_string(),
            self_ms_diff: signed_delta(baseline.self_ms, candidate.self_ms),
            self_hits_diff: signed_delta(baseline.self_hits, candidate.self_hits),
            ms1: baseline.self_ms,
            ms2: candidate.self_ms,
            hits1: baseline.self_hits,
            hits2: candidate.self_hits,
        }
    }

    /// Absolute percentage change in self ms
    pub fn ms_percent_diff(&self) -> f64 {
        percentage_diff(self.ms1, self.ms2).abs()
    }

    /// Absolute percentage change in self hits
    pub fn hits_percent_diff(&self) -> f64 {
        percentage_diff(self.hits1, self.hits2).abs()
    }
}

/// Which part of a function's identity disagreed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceField {
    Name,
    File,
    Line,
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self {
            Self::Name => "name",
            Self::File => "file",
            Self::Line => "line",
        };
        f.write_str(field)
    }
}

/// The same key resolved to different source identities in the two traces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("`{key}` has {field} {baseline:?} in baseline but {candidate:?} in candidate")]
pub struct IdentityMismatch {
    pub key: FunctionKey,
    pub field: SourceField,
    pub baseline: String,
    pub candidate: String,
}

/// Result of comparing a baseline trace with a candidate trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    pub summary: DiffSummary,

    /// Significant functions, in baseline key order
    pub significant: Vec<(FunctionKey, DiffRecord)>,

    /// Keys skipped because their identity disagreed
    pub mismatches: Vec<IdentityMismatch>,

    /// Keys present in both traces
    pub matched: usize,
}

impl DiffReport {
    pub fn len(&self) -> usize {
        self.significant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant.is_empty()
    }

    pub fn get(&self, key: &FunctionKey) -> Option<&DiffRecord> {
        self.significant
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FunctionKey, &DiffRecord)> {
        self.significant.iter().map(|(key, record)| (key, record))
    }
}
