#![no_main]

use arbitrary::Arbitrary;
use autolint_core::to_json;
use autolint_validator::{ComposerManifest, ValidationOptions, ValidatorFactory};
use libfuzzer_sys::fuzz_target;
use serde::Serialize;
use std::collections::BTreeMap;

/// Arbitrary composer.json autoload structure for structured fuzzing.
///
/// Absent keys are omitted rather than written as `null`, which the
/// manifest model rejects for loader entries.
#[derive(Debug, Clone, Arbitrary, Serialize)]
struct FuzzComposerJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    autoload: Option<FuzzAutoload>,
    #[serde(rename = "autoload-dev", skip_serializing_if = "Option::is_none")]
    autoload_dev: Option<FuzzAutoload>,
}

#[derive(Debug, Clone, Arbitrary, Serialize)]
struct FuzzAutoload {
    #[serde(rename = "psr-4", skip_serializing_if = "Option::is_none")]
    psr4: Option<BTreeMap<String, String>>,
    #[serde(rename = "psr-0", skip_serializing_if = "Option::is_none")]
    psr0: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classmap: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<String>>,
    #[serde(rename = "exclude-from-classmap", skip_serializing_if = "Option::is_none")]
    exclude_from_classmap: Option<Vec<String>>,
}

fuzz_target!(|data: FuzzComposerJson| {
    let Ok(json) = to_json(&data) else {
        return;
    };

    let manifest = ComposerManifest::from_json(&json).expect("generated manifest should parse");
    let options = ValidationOptions::new("/nonexistent");

    // Building validators must fail cleanly or succeed, never panic
    if let Ok(factory) = ValidatorFactory::for_manifest(&manifest, &options) {
        let _ = factory.from_manifest(&manifest, true);
    }
});
