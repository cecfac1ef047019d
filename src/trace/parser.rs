// Line scanner for callgrind-style function cost traces
//
// Only two line kinds matter: a `fn=<key>` header and the line right after
// it, whose second and third whitespace-separated tokens are the self time
// and self hit count. Everything else is skipped.

use crate::error::TraceError;
use crate::trace::header::FunctionHeader;
use crate::trace::index::{CostLineError, CostRecord, RejectedRecord, TraceIndex};
use crate::trace::key::FunctionKey;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const HEADER_PREFIX: &str = "fn=";
const MS_TOKEN: usize = 1;
const HITS_TOKEN: usize = 2;

/// Controls which records a parse keeps and how malformed ones are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep records whose header has no usable file/line
    pub keep_unresolved: bool,

    /// Fail the whole parse on a malformed cost line instead of rejecting it
    pub strict: bool,
}

impl ParseOptions {
    /// Options for single-trace totals: every record counts
    pub fn summary() -> Self {
        Self {
            keep_unresolved: true,
            strict: false,
        }
    }

    /// Options for comparisons: only records with a stable source location
    pub fn diff() -> Self {
        Self {
            keep_unresolved: false,
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Read and parse a trace file
///
/// Invalid UTF-8 is decoded lossily; only an unreadable file is an error.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<TraceIndex, TraceError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        tracing::warn!(
            "Trace {} is not valid UTF-8, invalid bytes replaced",
            path.display()
        );
    }

    tracing::debug!("Parsing trace {} ({} bytes)", path.display(), bytes.len());
    parse(&text, options)
}

/// Parse trace text into an index keyed by raw header text
///
/// # Example
/// ```
/// use cgdiff::trace::{parse, FunctionKey, ParseOptions};
///
/// let text = "fn=foo a.c:10\n0 10 5\nfn=foo a.c:10\n0 20 10\n";
/// let index = parse(text, &ParseOptions::summary()).unwrap();
///
/// let records = index.get(&FunctionKey::from("foo a.c:10")).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(index.total_ms(), 30);
/// assert_eq!(index.total_hits(), 15);
/// ```
pub fn parse(text: &str, options: &ParseOptions) -> Result<TraceIndex, TraceError> {
    let mut index = TraceIndex::new();
    let mut lines = text.lines().enumerate().peekable();

    while let Some((line_idx, line)) = lines.next() {
        let Some(raw) = header_key(line) else {
            continue;
        };

        let header = FunctionHeader::parse(raw);
        if !options.keep_unresolved && !header.is_resolved() {
            continue;
        }

        // The cost line is only peeked: a header following a header is
        // still scanned as a header on the next iteration.
        let cost = match lines.peek() {
            Some((_, cost_line)) => parse_cost_line(cost_line),
            None => Err(CostLineError::MissingLine),
        };

        let key = FunctionKey::new(raw);
        match cost {
            Ok((self_ms, self_hits)) => {
                index.push(key, CostRecord::new(header, self_ms, self_hits));
            }
            Err(reason) if options.strict => {
                return Err(TraceError::MalformedCost {
                    line: line_idx + 1,
                    key,
                    reason,
                });
            }
            Err(reason) => {
                let rejected = RejectedRecord {
                    line: line_idx + 1,
                    key,
                    reason,
                };
                tracing::warn!("Rejecting malformed record at {}", rejected);
                index.reject(rejected);
            }
        }
    }

    tracing::debug!(
        "Parsed {} records under {} keys ({} rejected)",
        index.record_count(),
        index.len(),
        index.rejected().len()
    );

    Ok(index)
}

/// Raw header text if `line` is a non-empty `fn=` header
fn header_key(line: &str) -> Option<&str> {
    line.strip_prefix(HEADER_PREFIX).filter(|rest| !rest.is_empty())
}

fn parse_cost_line(line: &str) -> Result<(u64, u64), CostLineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let self_ms = cost_token(&tokens, MS_TOKEN, line)?;
    let self_hits = cost_token(&tokens, HITS_TOKEN, line)?;
    Ok((self_ms, self_hits))
}

fn cost_token(tokens: &[&str], index: usize, line: &str) -> Result<u64, CostLineError> {
    let token = tokens.get(index).ok_or_else(|| CostLineError::MissingToken {
        index,
        line: line.to_string(),
    })?;

    token
        .parse::<u64>()
        .map_err(|source| CostLineError::InvalidToken {
            index,
            token: token.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::header::{UNKNOWN_FILE, UNKNOWN_LINE};

    #[test]
    fn test_parse_single_record() {
        let index = parse("fn=foo a.c:10\n0 10 5\n", &ParseOptions::diff()).unwrap();

        let records = index.get(&FunctionKey::from("foo a.c:10")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "foo");
        assert_eq!(records[0].file(), "a.c");
        assert_eq!(records[0].line(), "10");
        assert_eq!(records[0].self_ms, 10);
        assert_eq!(records[0].self_hits, 5);
    }

    #[test]
    fn test_parse_sums_duplicate_occurrences() {
        let text = "fn=foo a.c:10\n0 10 5\nfn=foo a.c:10\n0 20 10\n";
        let index = parse(text, &ParseOptions::summary()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.record_count(), 2);
        assert_eq!(index.total_ms(), 30);
        assert_eq!(index.total_hits(), 15);
    }

    #[test]
    fn test_parse_ignores_unrelated_lines() {
        let text = "version: 1\ncreator: test\nevents: ms hits\n\nfl=a.c\nfn=foo a.c:10\n3 7 2\ncalls=1 0\n";
        let index = parse(text, &ParseOptions::diff()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.total_ms(), 7);
        assert_eq!(index.total_hits(), 2);
    }

    #[test]
    fn test_parse_unresolved_header_kept_in_summary_mode() {
        let text = "fn=(program)\n0 4 2\n";
        let index = parse(text, &ParseOptions::summary()).unwrap();

        let records = index.get(&FunctionKey::from("(program)")).unwrap();
        assert_eq!(records[0].name(), "(program)");
        assert_eq!(records[0].file(), UNKNOWN_FILE);
        assert_eq!(records[0].line(), UNKNOWN_LINE);
    }

    #[test]
    fn test_parse_unresolved_header_dropped_in_diff_mode() {
        let text = "fn=(program)\n0 4 2\nfn=foo a.c:10\n0 1 1\n";
        let index = parse(text, &ParseOptions::diff()).unwrap();

        assert!(!index.contains_key(&FunctionKey::from("(program)")));
        assert_eq!(index.total_ms(), 1);
    }

    #[test]
    fn test_parse_tolerates_crlf_and_extra_whitespace() {
        let text = "fn=foo a.c:10\r\n  0\t10   5  \r\n";
        let index = parse(text, &ParseOptions::diff()).unwrap();
        assert_eq!(index.total_ms(), 10);
        assert_eq!(index.total_hits(), 5);
    }

    #[test]
    fn test_parse_bare_prefix_is_not_a_header() {
        let index = parse("fn=\n0 10 5\n", &ParseOptions::summary()).unwrap();
        assert!(index.is_empty());
        assert!(index.rejected().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_numeric_cost() {
        let text = "fn=foo a.c:10\n0 ten 5\nfn=bar b.c:2\n0 3 1\n";
        let index = parse(text, &ParseOptions::diff()).unwrap();

        assert!(!index.contains_key(&FunctionKey::from("foo a.c:10")));
        assert_eq!(index.total_ms(), 3);

        let rejected = index.rejected();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].line, 1);
        assert_eq!(rejected[0].key, FunctionKey::from("foo a.c:10"));
        assert!(matches!(
            rejected[0].reason,
            CostLineError::InvalidToken { index: 1, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_short_cost_line() {
        let index = parse("fn=foo a.c:10\n0 10\n", &ParseOptions::diff()).unwrap();
        assert!(index.is_empty());
        assert!(matches!(
            index.rejected()[0].reason,
            CostLineError::MissingToken { index: 2, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_header_on_last_line() {
        let index = parse("fn=foo a.c:10", &ParseOptions::diff()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.rejected()[0].reason, CostLineError::MissingLine);
    }

    #[test]
    fn test_parse_rejects_negative_cost() {
        let index = parse("fn=foo a.c:10\n0 -4 1\n", &ParseOptions::diff()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.rejected().len(), 1);
    }

    #[test]
    fn test_parse_strict_fails_on_malformed_cost() {
        let text = "fn=foo a.c:10\n0 1 1\nfn=bar b.c:2\n0 x 1\n";
        let err = parse(text, &ParseOptions::diff().with_strict(true)).unwrap_err();

        match err {
            TraceError::MalformedCost { line, key, .. } => {
                assert_eq!(line, 3);
                assert_eq!(key, FunctionKey::from("bar b.c:2"));
            }
            other => panic!("Expected MalformedCost, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_strict_ignores_dropped_unresolved_records() {
        // Unresolved records are filtered before their cost line is read
        let text = "fn=(program)\ngarbage\nfn=foo a.c:10\n0 1 1\n";
        let index = parse(text, &ParseOptions::diff().with_strict(true)).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_parse_header_followed_by_header() {
        // The second header doubles as the first one's cost line
        let text = "fn=foo a.c:10\nfn=bar b.c:2\n0 3 1\n";
        let index = parse(text, &ParseOptions::diff()).unwrap();

        assert!(!index.contains_key(&FunctionKey::from("foo a.c:10")));
        assert_eq!(index.rejected().len(), 1);
        assert_eq!(index.total_ms(), 3);
    }

    #[test]
    fn test_parse_file_missing() {
        let err =
            parse_file("/nonexistent/trace.callgrind", &ParseOptions::summary()).unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/trace.callgrind"));
    }

    #[test]
    fn test_parse_file_tolerates_invalid_utf8() {
        use std::io::Write;

        // Latin-1 encoded "café"
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fn=caf\xe9 a.c:1\n0 5 5\nfn=foo a.c:10\n0 10 5\n")
            .unwrap();

        let index = parse_file(file.path(), &ParseOptions::summary()).unwrap();
        assert_eq!(index.total_ms(), 15);
        assert_eq!(index.total_hits(), 10);
        assert!(index.rejected().is_empty());

        let records = index.get(&FunctionKey::from("caf\u{FFFD} a.c:1")).unwrap();
        assert_eq!(records[0].name(), "caf\u{FFFD}");
        assert_eq!(records[0].file(), "a.c");
    }

    #[test]
    fn test_parse_empty_file_part_keeps_line() {
        let text = "fn=foo :12\n0 1 1\n";

        let summary = parse(text, &ParseOptions::summary()).unwrap();
        let records = summary.get(&FunctionKey::from("foo :12")).unwrap();
        assert_eq!(records[0].name(), "foo");
        assert_eq!(records[0].file(), UNKNOWN_FILE);
        assert_eq!(records[0].line(), "12");

        // Still unresolved, so comparisons leave it out
        let diff = parse(text, &ParseOptions::diff()).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn test_parse_file_reads_contents() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "fn=foo a.c:10\n0 10 5\n").unwrap();

        let index = parse_file(file.path(), &ParseOptions::diff()).unwrap();
        assert_eq!(index.total_ms(), 10);
    }
}
