//! Callgrind trace parsing
//!
//! Turns profiler output into a [`TraceIndex`]: every `fn=` header and the
//! self cost on the line after it, grouped under the raw header text.
//! Call graphs, inclusive costs, and name compression are not interpreted.

mod header;
mod index;
mod key;
mod parser;

pub use header::{FunctionHeader, ANONYMOUS_FUNCTION, UNKNOWN_FILE, UNKNOWN_LINE};
pub use index::{CostLineError, CostRecord, RejectedRecord, TraceIndex, TraceTotals};
pub use key::FunctionKey;
pub use parser::{parse, parse_file, ParseOptions};
