// Parsing of the `<name> <file>:<line>` suffix carried by function headers
//
// Headers that do not follow the pattern still produce a record; they are
// simply marked unresolved so callers can decide whether to keep them.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Name used when the header matched but carried an empty name
pub const ANONYMOUS_FUNCTION: &str = "(anonymous function)";

/// File reported for unresolved headers
pub const UNKNOWN_FILE: &str = "(unknown)";

/// Line reported for unresolved headers
pub const UNKNOWN_LINE: &str = "(?)";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.*)\s([^\s]*):(\d+)$").expect("header pattern is a valid regex")
    })
}

/// Parsed view of a function header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FunctionHeader {
    /// Header carried a usable source location
    Resolved {
        name: String,
        file: String,
        line: String,
    },

    /// Header had no usable source location
    ///
    /// `line` survives when only the file part was empty, e.g. `foo :12`.
    Unresolved {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<String>,
    },
}

impl FunctionHeader {
    /// Parse the raw text after `fn=`
    ///
    /// # Example
    /// ```
    /// use cgdiff::trace::FunctionHeader;
    ///
    /// let header = FunctionHeader::parse("foo src/a.c:10");
    /// assert_eq!(header.name(), "foo");
    /// assert_eq!(header.file(), "src/a.c");
    /// assert_eq!(header.line(), "10");
    ///
    /// let header = FunctionHeader::parse("0x4005d0");
    /// assert!(!header.is_resolved());
    /// assert_eq!(header.file(), "(unknown)");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = name_pattern().captures(raw) else {
            return Self::Unresolved {
                name: raw.to_string(),
                line: None,
            };
        };

        let name = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_FUNCTION)
            .to_string();
        let file = &caps[2];

        // `(\d+)` matched but the file part is empty, e.g. "foo :12"
        if file.is_empty() {
            return Self::Unresolved {
                name,
                line: Some(caps[3].to_string()),
            };
        }

        Self::Resolved {
            name,
            file: file.to_string(),
            line: caps[3].to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Resolved { name, .. } | Self::Unresolved { name, .. } => name,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::Resolved { file, .. } => file,
            Self::Unresolved { .. } => UNKNOWN_FILE,
        }
    }

    pub fn line(&self) -> &str {
        match self {
            Self::Resolved { line, .. } => line,
            Self::Unresolved { line, .. } => line.as_deref().unwrap_or(UNKNOWN_LINE),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}
