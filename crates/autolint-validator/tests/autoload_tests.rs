//! End-to-end validation of package trees.

use autolint_test_utils::fixtures::Fixtures;
use autolint_test_utils::temp_project::TempProject;
use autolint_validator::{
    AutoloadValidator, CallbackRegistry, ComposerManifest, ParamValue, Report, Severity,
    ValidationOptions, Violation,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn run(project: &TempProject, options: ValidationOptions) -> AutoloadValidator {
    let manifest = ComposerManifest::from_file(project.composer_json_path()).unwrap();
    let mut validator =
        AutoloadValidator::from_manifest(&manifest, &options, Report::default()).unwrap();
    validator.validate().unwrap();
    validator.class_map().unwrap();
    validator
}

fn kinds(violations: &[Violation]) -> Vec<&'static str> {
    violations.iter().map(Violation::kind_id).collect()
}

fn param(violation: &Violation, name: &str) -> Option<ParamValue> {
    violation
        .params()
        .into_iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[test]
fn consistent_package_is_clean() {
    let project = TempProject::new()
        .with_composer_json(Fixtures::full_composer_json())
        .with_php_class("src/Writer.php", "Acme\\Log", "Writer")
        .with_php_class("src/Handler/Stream.php", "Acme\\Log\\Handler", "Stream")
        .with_file("src/helpers.php", Fixtures::php_helpers_content())
        .with_php_class("legacy/Acme/Legacy/Thing.php", "", "Acme_Legacy_Thing")
        .with_php_class("lib/OldStuff.php", "", "OldStuff")
        .with_php_class("lib/Tests/OldStuffTest.php", "", "OldStuffTest")
        .with_php_class("tests/WriterTest.php", "Acme\\Log\\Tests", "WriterTest")
        .build()
        .unwrap();

    let mut validator = run(&project, ValidationOptions::new(project.path()));

    assert!(validator.report().is_empty(), "{:?}", validator.report());
    let map = validator.class_map().unwrap();
    assert!(map.has("Acme\\Log\\Writer"));
    assert!(map.has("Acme\\Log\\Handler\\Stream"));
    assert!(map.has("Acme_Legacy_Thing"));
    assert!(map.has("OldStuff"));
    assert!(map.has("Acme\\Log\\Tests\\WriterTest"));
    assert!(!map.has("OldStuffTest"), "exclude-from-classmap is honoured");
}

#[test]
fn violations_follow_declaration_order() {
    let project = TempProject::new()
        .with_composer_json(json!({
            "autoload": {
                "psr-4": { "Acme\\": "src/", "Broken": "src/" },
                "files": ["missing.php"],
                "classmap": ["empty/"]
            }
        }))
        .with_php_class("src/Wrong/Place.php", "Acme", "Place")
        .with_dir("empty")
        .build()
        .unwrap();

    let validator = run(&project, ValidationOptions::new(project.path()));

    assert_eq!(
        kinds(validator.report().errors()),
        vec![
            "ClassFoundInWrongFile",
            "NamespaceMustEndWithBackslash",
            "FileNotFound",
            "NoClassesFoundInPath",
        ]
    );
    assert!(validator.report().is_failure());
}

#[test]
fn wrong_file_names_both_paths() {
    let project = TempProject::new()
        .with_composer_json(Fixtures::psr4_composer_json("Acme\\", "src/"))
        .with_php_class("src/Wrong/Place.php", "Acme", "Place")
        .build()
        .unwrap();

    let validator = run(&project, ValidationOptions::new(project.path()));
    let error = &validator.report().errors()[0];

    assert_eq!(
        param(error, "fileIs"),
        Some(ParamValue::Text(project.display_path("src/Wrong/Place.php")))
    );
    assert_eq!(
        param(error, "fileShould"),
        Some(ParamValue::Text(project.display_path("src/Place.php")))
    );
    assert_eq!(
        param(error, "validatorName"),
        Some(ParamValue::Text("autoload.psr-4".to_string()))
    );
}

#[test]
fn duplicate_between_sections_keeps_first() {
    let project = TempProject::new()
        .with_composer_json(json!({
            "autoload": { "psr-4": { "Acme\\": "src/" } },
            "autoload-dev": { "classmap": ["fixtures/"] }
        }))
        .with_php_class("src/Foo.php", "Acme", "Foo")
        .with_php_class("fixtures/Foo.php", "Acme", "Foo")
        .build()
        .unwrap();

    let mut validator = run(&project, ValidationOptions::new(project.path()));

    let errors = validator.report().errors().to_vec();
    assert_eq!(kinds(&errors), vec!["ClassAddedMoreThanOnce"]);
    assert_eq!(errors[0].validator_name(), "autoload.psr-4, autoload-dev.classmap");
    assert_eq!(
        param(&errors[0], "files"),
        Some(ParamValue::Map(vec![
            ("autoload.psr-4".to_string(), project.display_path("src/Foo.php")),
            ("autoload-dev.classmap".to_string(), project.display_path("fixtures/Foo.php")),
        ]))
    );
    assert!(errors[0].message().ends_with("{files}"));

    let kept = validator.class_map().unwrap().file_for("Acme\\Foo").unwrap();
    assert!(kept.ends_with("src/Foo.php"));
}

#[test]
fn no_dev_skips_dev_section() {
    let project = TempProject::new()
        .with_composer_json(json!({
            "autoload": { "psr-4": { "Acme\\": "src/" } },
            "autoload-dev": { "psr-4": { "Acme\\Tests\\": "tests/" } }
        }))
        .with_php_class("src/Foo.php", "Acme", "Foo")
        .build()
        .unwrap();

    let validator = run(&project, ValidationOptions::new(project.path()).without_dev());
    assert_eq!(validator.validators().len(), 1);
    assert!(validator.report().is_empty());
}

#[rstest]
#[case::silence(Some(None), 0, 0)]
#[case::escalate(Some(Some(Severity::Error)), 0, 1)]
#[case::unchanged(None, 1, 0)]
fn psr0_warning_respects_remap(
    #[case] remap: Option<Option<Severity>>,
    #[case] warnings: usize,
    #[case] errors: usize,
) {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "psr-0": { "Acme\\Log\\Writer": "src/" } } }))
        .with_php_class("src/Acme/Log/Writer/File.php", "Acme\\Log\\Writer", "File")
        .build()
        .unwrap();

    let mut options = ValidationOptions::new(project.path());
    if let Some(to) = remap {
        options = options.remap(Severity::Warning, to);
    }
    let manifest = ComposerManifest::from_file(project.composer_json_path()).unwrap();
    let report = options.build_report(Vec::new());
    let mut validator = AutoloadValidator::from_manifest(&manifest, &options, report).unwrap();
    validator.validate().unwrap();

    assert_eq!(validator.report().warnings().len(), warnings);
    assert_eq!(validator.report().errors().len(), errors);
    assert!(validator.class_map().unwrap().has("Acme\\Log\\Writer\\File"));
}

#[test]
fn explicit_exclusions_apply_to_every_loader() {
    let project = TempProject::new()
        .with_composer_json(Fixtures::psr4_composer_json("Acme\\", "src/"))
        .with_php_class("src/Foo.php", "Acme", "Foo")
        .with_php_class("src/Generated/Wrong.php", "Acme", "Wrong")
        .build()
        .unwrap();

    let validator = run(
        &project,
        ValidationOptions::new(project.path()).exclude(["/Generated/"]),
    );
    assert!(validator.report().is_empty());
}

#[test]
fn unknown_loader_type_stops_before_validation() {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "psr-5": { "Acme\\": "src/" } } }))
        .build()
        .unwrap();

    let manifest = ComposerManifest::from_file(project.composer_json_path()).unwrap();
    let err = AutoloadValidator::from_manifest(
        &manifest,
        &ValidationOptions::new(project.path()),
        Report::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), autolint_core::ErrorCode::E0101);
}

#[test]
fn registration_makes_classes_resolvable() {
    let project = TempProject::new()
        .with_composer_json(Fixtures::full_composer_json())
        .with_php_class("src/Writer.php", "Acme\\Log", "Writer")
        .with_file("src/helpers.php", Fixtures::php_helpers_content())
        .with_php_class("legacy/Acme/Legacy/Thing.php", "", "Acme_Legacy_Thing")
        .with_php_class("lib/OldStuff.php", "", "OldStuff")
        .with_php_class("tests/WriterTest.php", "Acme\\Log\\Tests", "WriterTest")
        .build()
        .unwrap();

    let mut validator = run(&project, ValidationOptions::new(project.path()));
    let mut runtime = CallbackRegistry::new();
    validator.register(&mut runtime).unwrap();

    assert!(runtime.resolve("Acme\\Log\\Writer").is_some());
    assert!(runtime.resolve("Acme_Legacy_Thing").is_some());
    assert!(runtime.resolve("OldStuff").is_some());
    assert!(runtime.resolve("Acme\\Log\\Missing").is_none());
    assert_eq!(runtime.included().len(), 1);
}
