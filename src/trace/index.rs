// Per-trace index of function cost records
//
// Keys keep first-seen order so reports come out in trace order without a
// separate sort. Repeated keys append; nothing is ever merged or overwritten.

use crate::trace::header::FunctionHeader;
use crate::trace::key::FunctionKey;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One occurrence of a function's self cost in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostRecord {
    pub header: FunctionHeader,
    pub self_ms: u64,
    pub self_hits: u64,
}

impl CostRecord {
    pub fn new(header: FunctionHeader, self_ms: u64, self_hits: u64) -> Self {
        Self {
            header,
            self_ms,
            self_hits,
        }
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn file(&self) -> &str {
        self.header.file()
    }

    pub fn line(&self) -> &str {
        self.header.line()
    }
}

/// Why a cost line could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CostLineError {
    #[error("header is the last line of the trace, no cost line follows")]
    MissingLine,

    #[error("cost line has no token {index}: {line:?}")]
    MissingToken { index: usize, line: String },

    #[error("cost token {index} is not a non-negative integer: {token:?}")]
    InvalidToken {
        index: usize,
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// A header whose cost line was malformed, kept out of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// 1-based line number of the `fn=` header
    pub line: usize,
    pub key: FunctionKey,
    pub reason: CostLineError,
}

impl fmt::Display for RejectedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: `{}`: {}", self.line, self.key, self.reason)
    }
}

/// Trace-wide self cost totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraceTotals {
    pub ms: u64,
    pub hits: u64,
}

/// Ordered mapping from function key to every cost record seen for it
#[derive(Debug, Clone, Default)]
pub struct TraceIndex {
    entries: Vec<(FunctionKey, Vec<CostRecord>)>,
    positions: HashMap<FunctionKey, usize>,
    rejected: Vec<RejectedRecord>,
}

impl TraceIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under `key`, creating the entry on first sight
    pub(crate) fn push(&mut self, key: FunctionKey, record: CostRecord) {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1.push(record),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![record]));
            }
        }
    }

    pub(crate) fn reject(&mut self, rejected: RejectedRecord) {
        self.rejected.push(rejected);
    }

    /// Records for a key, in order of appearance
    pub fn get(&self, key: &FunctionKey) -> Option<&[CostRecord]> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn contains_key(&self, key: &FunctionKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records across all keys, duplicates included
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    /// Iterate entries in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&FunctionKey, &[CostRecord])> {
        self.entries
            .iter()
            .map(|(key, records)| (key, records.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &FunctionKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Sum of self cost over every record, duplicates included
    pub fn totals(&self) -> TraceTotals {
        self.entries
            .iter()
            .flat_map(|(_, records)| records)
            .fold(TraceTotals::default(), |acc, record| TraceTotals {
                ms: acc.ms.saturating_add(record.self_ms),
                hits: acc.hits.saturating_add(record.self_hits),
            })
    }

    pub fn total_ms(&self) -> u64 {
        self.totals().ms
    }

    pub fn total_hits(&self) -> u64 {
        self.totals().hits
    }

    /// Keys that occur more than once in the trace
    pub fn duplicates(&self) -> Vec<&FunctionKey> {
        self.entries
            .iter()
            .filter(|(_, records)| records.len() > 1)
            .map(|(key, _)| key)
            .collect()
    }

    /// Headers dropped because their cost line was malformed
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }
}

impl FromIterator<(FunctionKey, CostRecord)> for TraceIndex {
    fn from_iter<I: IntoIterator<Item = (FunctionKey, CostRecord)>>(iter: I) -> Self {
        let mut index = TraceIndex::new();
        for (key, record) in iter {
            index.push(key, record);
        }
        index
    }
}
