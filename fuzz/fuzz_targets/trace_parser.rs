#![no_main]

use cgdiff::diff::{diff, ThresholdConfig};
use cgdiff::trace::{parse, ParseOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and self-comparison must not panic regardless of input
        let Ok(index) = parse(input, &ParseOptions::summary()) else {
            return;
        };
        let _ = diff(&index, &index, &ThresholdConfig::default());
    }
});
