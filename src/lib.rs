//! cgdiff - callgrind profile comparison
//!
//! This library parses callgrind-format function cost traces and compares
//! a baseline trace with a candidate trace, reporting the functions whose
//! self time and self hit count both moved more than the trace as a whole.

pub mod cli;
pub mod diff;
pub mod error;
pub mod output;
pub mod trace;
