#![no_main]

use autolint_validator::PhpFileParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let classes = PhpFileParser::find_classes(source);
    let definitions = PhpFileParser::find_definitions(source);
    assert_eq!(classes.len(), definitions.len());

    for class in &classes {
        assert!(!class.is_empty(), "empty class name from {source:?}");
        assert!(!class.starts_with('\\'), "unnormalized name {class}");
    }

    if PhpFileParser::strip(source).is_none() {
        assert!(classes.is_empty());
    }
});
