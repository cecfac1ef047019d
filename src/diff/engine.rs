// Significance filtering of per-function changes
//
// Only keys present in both traces are compared. A function is reported
// when it beats the trace-wide drift on BOTH ms and hits, in relative terms
// and by more than the adaptive absolute floor.

use crate::diff::config::{Aggregation, MismatchPolicy, ThresholdConfig};
use crate::diff::report::{DiffRecord, DiffReport, FunctionCost, IdentityMismatch, SourceField};
use crate::diff::statistics::DiffSummary;
use crate::error::DiffError;
use crate::trace::{CostRecord, FunctionKey, TraceIndex};

/// Compare a baseline trace with a candidate trace
///
/// # Example
/// ```
/// use cgdiff::diff::{diff, ThresholdConfig};
/// use cgdiff::trace::{parse, FunctionKey, ParseOptions};
///
/// let baseline = "fn=foo a.c:10\n0 10 5\nfn=bar b.c:1\n0 100 100\n";
/// let candidate = "fn=foo a.c:10\n0 50 25\nfn=bar b.c:1\n0 100 100\n";
/// let baseline = parse(baseline, &ParseOptions::diff()).unwrap();
/// let candidate = parse(candidate, &ParseOptions::diff()).unwrap();
///
/// let config = ThresholdConfig {
///     threshold_factor: 0.0,
///     min_threshold: 0.0,
///     ..ThresholdConfig::default()
/// };
/// let report = diff(&baseline, &candidate, &config).unwrap();
///
/// let foo = report.get(&FunctionKey::from("foo a.c:10")).unwrap();
/// assert_eq!(foo.self_ms_diff, 40);
/// assert_eq!(foo.self_hits_diff, 20);
/// ```
pub fn diff(
    baseline: &TraceIndex,
    candidate: &TraceIndex,
    config: &ThresholdConfig,
) -> Result<DiffReport, DiffError> {
    config.validate()?;

    let summary = DiffSummary::new(baseline.totals(), candidate.totals(), config);
    tracing::debug!(
        "Trace drift: ms {:+.2}% hits {:+.2}%, thresholds ms={} hits={}",
        summary.rel_ms_diff,
        summary.rel_hits_diff,
        summary.threshold_ms,
        summary.threshold_hits
    );

    let mut significant = Vec::new();
    let mut mismatches = Vec::new();
    let mut matched = 0;

    for (key, baseline_records) in baseline.iter() {
        let Some(candidate_records) = candidate.get(key) else {
            tracing::trace!("`{}` missing from candidate trace", key);
            continue;
        };
        let (Some(base), Some(cand)) = (
            aggregate(baseline_records, config.aggregation),
            aggregate(candidate_records, config.aggregation),
        ) else {
            continue;
        };
        matched += 1;

        if let Err(mismatch) = validate_same_source(key, &base, &cand) {
            match config.on_mismatch {
                MismatchPolicy::Fail => return Err(mismatch.into()),
                MismatchPolicy::Warn => {
                    tracing::warn!("Skipping {}", mismatch);
                    mismatches.push(mismatch);
                    continue;
                }
            }
        }

        let record = DiffRecord::new(&base, &cand);
        if is_significant(&record, &summary) {
            significant.push((key.clone(), record));
        }
    }

    tracing::debug!(
        "{} of {} matched functions changed significantly",
        significant.len(),
        matched
    );

    Ok(DiffReport {
        summary,
        significant,
        mismatches,
        matched,
    })
}

/// Whether a per-function change clears all four significance tests
pub fn is_significant(record: &DiffRecord, summary: &DiffSummary) -> bool {
    record.ms_percent_diff() > summary.rel_ms_diff.abs()
        && record.self_ms_diff.unsigned_abs() as f64 > summary.threshold_ms
        && record.hits_percent_diff() > summary.rel_hits_diff.abs()
        && record.self_hits_diff.unsigned_abs() as f64 > summary.threshold_hits
}

/// Check that both traces agree on what a key refers to
pub fn validate_same_source(
    key: &FunctionKey,
    baseline: &FunctionCost<'_>,
    candidate: &FunctionCost<'_>,
) -> Result<(), IdentityMismatch> {
    let fields = [
        (SourceField::Name, baseline.name, candidate.name),
        (SourceField::File, baseline.file, candidate.file),
        (SourceField::Line, baseline.line, candidate.line),
    ];

    match fields.into_iter().find(|(_, base, cand)| base != cand) {
        Some((field, base, cand)) => Err(IdentityMismatch {
            key: key.clone(),
            field,
            baseline: base.to_string(),
            candidate: cand.to_string(),
        }),
        None => Ok(()),
    }
}

/// Collapse a key's records into one cost; identity comes from the first
fn aggregate(records: &[CostRecord], aggregation: Aggregation) -> Option<FunctionCost<'_>> {
    let first = records.first()?;
    let (self_ms, self_hits) = match aggregation {
        Aggregation::First => (first.self_ms, first.self_hits),
        Aggregation::Sum => records.iter().fold((0u64, 0u64), |(ms, hits), record| {
            (
                ms.saturating_add(record.self_ms),
                hits.saturating_add(record.self_hits),
            )
        }),
    };

    Some(FunctionCost {
        name: first.name(),
        file: first.file(),
        line: first.line(),
        self_ms,
        self_hits,
    })
}
