#![no_main]

use autolint_validator::{Severity, parse_severity_remap};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok((from, to)) = parse_severity_remap(data) {
        assert!(data.contains('='));
        assert!(Severity::ALL.contains(&from));
        if let Some(to) = to {
            assert!(Severity::ALL.contains(&to));
        }
    }
});
