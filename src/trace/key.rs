// Function identity within and across traces
//
// The raw text after `fn=` is the identity, not the parsed name. Two
// overloads that render to the same name but differ anywhere in the header
// stay distinct, and lookups can never accidentally go through a parsed name.

use serde::Serialize;
use std::fmt;

/// Raw, unparsed function header text used as the aggregation key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FunctionKey(String);

impl FunctionKey {
    /// Wrap raw header text (everything after `fn=`)
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw header text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for FunctionKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
