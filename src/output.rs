//! Text and JSON rendering of summaries and comparisons
//!
//! Text lines look like `ms:   120 => 210 ... +90 (+75.00%)`.

use crate::cli::OutputFormat;
use crate::diff::{
    percentage_diff, signed_delta, DiffRecord, DiffReport, DiffSummary, IdentityMismatch,
};
use crate::trace::{FunctionKey, TraceIndex, TraceTotals};
use serde::Serialize;
use std::io::{self, Write};

/// Prefix positive numbers with `+`
pub fn format_sign_num(num: i64) -> String {
    if num > 0 {
        format!("+{}", num)
    } else {
        num.to_string()
    }
}

/// Signed percentage with two decimals, e.g. `+12.50%`
///
/// The `+` is only added when the rounded value is positive, so tiny gains
/// print as `0.00%`.
pub fn format_sign_percent(percent: f64) -> String {
    let rounded = format!("{:.2}", percent);
    let positive = rounded.parse::<f64>().is_ok_and(|value| value > 0.0);
    if positive {
        format!("+{}%", rounded)
    } else {
        format!("{}%", rounded)
    }
}

/// `before => after ... delta (percent)`
///
/// # Example
/// ```
/// use cgdiff::output::format_change;
///
/// assert_eq!(format_change(10, 50), "10 => 50 ... +40 (+400.00%)");
/// assert_eq!(format_change(50, 10), "50 => 10 ... -40 (-80.00%)");
/// ```
pub fn format_change(before: u64, after: u64) -> String {
    format!(
        "{} => {} ... {} ({})",
        before,
        after,
        format_sign_num(signed_delta(before, after)),
        format_sign_percent(percentage_diff(before, after))
    )
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    ms: u64,
    hits: u64,
    records: usize,
    duplicates: Vec<&'a FunctionKey>,
    rejected: Vec<String>,
}

#[derive(Serialize)]
struct JsonFunction<'a> {
    key: &'a FunctionKey,
    #[serde(flatten)]
    record: &'a DiffRecord,
}

#[derive(Serialize)]
struct JsonDiff<'a> {
    summary: &'a DiffSummary,
    matched: usize,
    functions: Vec<JsonFunction<'a>>,
    mismatches: &'a [IdentityMismatch],
}

/// Write totals for a single trace
pub fn write_summary<W: Write>(
    out: &mut W,
    index: &TraceIndex,
    format: OutputFormat,
) -> io::Result<()> {
    let TraceTotals { ms, hits } = index.totals();
    let duplicates = index.duplicates();

    match format {
        OutputFormat::Text => {
            writeln!(out, "ms:   {}", ms)?;
            writeln!(out, "hits: {}", hits)?;
            if !duplicates.is_empty() {
                writeln!(out, "duplicated functions: {}", duplicates.len())?;
            }
            if !index.rejected().is_empty() {
                writeln!(out, "rejected records: {}", index.rejected().len())?;
            }
        }
        OutputFormat::Json => {
            let json = JsonSummary {
                ms,
                hits,
                records: index.record_count(),
                duplicates,
                rejected: index.rejected().iter().map(ToString::to_string).collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Write the trace-wide change followed by every significant function
pub fn write_diff<W: Write>(
    out: &mut W,
    report: &DiffReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            let summary = &report.summary;
            writeln!(out)?;
            writeln!(out, "ms:   {}", format_change(summary.ms1, summary.ms2))?;
            writeln!(out, "hits: {}", format_change(summary.hits1, summary.hits2))?;
            writeln!(out)?;

            for (key, record) in report.iter() {
                writeln!(out, "{}", key)?;
                writeln!(out, "ms:   {}", format_change(record.ms1, record.ms2))?;
                writeln!(out, "hits: {}", format_change(record.hits1, record.hits2))?;
                writeln!(out)?;
            }
        }
        OutputFormat::Json => {
            let json = JsonDiff {
                summary: &report.summary,
                matched: report.matched,
                functions: report
                    .iter()
                    .map(|(key, record)| JsonFunction { key, record })
                    .collect(),
                mismatches: &report.mismatches,
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{diff, ThresholdConfig};
    use crate::trace::{parse, ParseOptions};

    fn render_summary(text: &str, format: OutputFormat) -> String {
        let index = parse(text, &ParseOptions::summary()).unwrap();
        let mut out = Vec::new();
        write_summary(&mut out, &index, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_report() -> DiffReport {
        let baseline = parse(
            "fn=foo a.c:10\n0 10 5\nfn=bar b.c:1\n0 100 100\n",
            &ParseOptions::diff(),
        )
        .unwrap();
        let candidate = parse(
            "fn=foo a.c:10\n0 50 25\nfn=bar b.c:1\n0 100 100\n",
            &ParseOptions::diff(),
        )
        .unwrap();
        let config = ThresholdConfig {
            threshold_factor: 0.0,
            min_threshold: 0.0,
            ..ThresholdConfig::default()
        };
        diff(&baseline, &candidate, &config).unwrap()
    }

    #[test]
    fn test_format_sign_num() {
        assert_eq!(format_sign_num(5), "+5");
        assert_eq!(format_sign_num(0), "0");
        assert_eq!(format_sign_num(-5), "-5");
    }

    #[test]
    fn test_format_sign_percent() {
        assert_eq!(format_sign_percent(12.5), "+12.50%");
        assert_eq!(format_sign_percent(-3.0), "-3.00%");
        assert_eq!(format_sign_percent(0.0), "0.00%");
        assert_eq!(format_sign_percent(0.001), "0.00%");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(100, 100), "100 => 100 ... 0 (0.00%)");
        assert_eq!(format_change(0, 7), "0 => 7 ... +7 (0.00%)");
    }

    #[test]
    fn test_summary_text() {
        let output = render_summary(
            "fn=foo a.c:10\n0 10 5\nfn=foo a.c:10\n0 20 10\n",
            OutputFormat::Text,
        );
        assert_eq!(output, "ms:   30\nhits: 15\nduplicated functions: 1\n");
    }

    #[test]
    fn test_summary_text_reports_rejected() {
        let output = render_summary("fn=foo a.c:10\n0 x 5\n", OutputFormat::Text);
        assert_eq!(output, "ms:   0\nhits: 0\nrejected records: 1\n");
    }

    #[test]
    fn test_summary_json() {
        let output = render_summary("fn=(program)\n0 4 2\n", OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["ms"], 4);
        assert_eq!(value["hits"], 2);
        assert_eq!(value["records"], 1);
        assert!(value["duplicates"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_diff_text() {
        let mut out = Vec::new();
        write_diff(&mut out, &sample_report(), OutputFormat::Text).unwrap();
        let output = String::from_utf8(out).unwrap();

        let expected = "\n\
            ms:   110 => 150 ... +40 (+36.36%)\n\
            hits: 105 => 125 ... +20 (+19.05%)\n\
            \n\
            foo a.c:10\n\
            ms:   10 => 50 ... +40 (+400.00%)\n\
            hits: 5 => 25 ... +20 (+400.00%)\n\
            \n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_diff_json() {
        let mut out = Vec::new();
        write_diff(&mut out, &sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["summary"]["ms1"], 110);
        assert_eq!(value["matched"], 2);
        let functions = value["functions"].as_array().unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0]["key"], "foo a.c:10");
        assert_eq!(functions[0]["name"], "foo");
        assert_eq!(functions[0]["self_ms_diff"], 40);
        assert!(value["mismatches"].as_array().unwrap().is_empty());
    }
}
