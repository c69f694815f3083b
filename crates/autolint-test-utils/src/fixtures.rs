//! Pre-built fixtures for autoload layouts.

use serde_json::{Value, json};

/// Collection of pre-built test fixtures.
#[derive(Debug)]
pub struct Fixtures;

impl Fixtures {
    /// composer.json without autoload sections.
    #[must_use]
    pub fn empty_composer_json() -> Value {
        json!({
            "name": "test/project",
            "description": "Test project",
            "type": "library",
            "require": {}
        })
    }

    /// composer.json with a single PSR-4 mapping.
    #[must_use]
    pub fn psr4_composer_json(prefix: &str, path: &str) -> Value {
        json!({
            "name": "test/psr4-project",
            "type": "library",
            "autoload": {
                "psr-4": { prefix: path }
            }
        })
    }

    /// composer.json using every loader type, plus a dev section.
    #[must_use]
    pub fn full_composer_json() -> Value {
        json!({
            "name": "acme/log-writer",
            "type": "library",
            "require": { "php": ">=8.1" },
            "autoload": {
                "psr-4": { "Acme\\Log\\": "src/" },
                "psr-0": { "Acme_Legacy_": "legacy/" },
                "classmap": ["lib/"],
                "files": ["src/helpers.php"],
                "exclude-from-classmap": ["lib/Tests/"]
            },
            "autoload-dev": {
                "psr-4": { "Acme\\Log\\Tests\\": "tests/" }
            }
        })
    }

    /// Source of a namespaced class. An empty namespace declares none.
    #[must_use]
    pub fn php_class_content(namespace: &str, class_name: &str) -> String {
        let namespace_line = if namespace.is_empty() {
            String::new()
        } else {
            format!("namespace {namespace};\n\n")
        };
        format!(
            r"<?php

declare(strict_types=1);

{namespace_line}/**
 * {class_name} class.
 */
final class {class_name}
{{
    public function __construct(private string $name = 'default')
    {{
    }}

    public function name(): string
    {{
        return $this->name;
    }}
}}
"
        )
    }

    /// Source of an interface.
    #[must_use]
    pub fn php_interface_content(namespace: &str, name: &str) -> String {
        format!("<?php\n\nnamespace {namespace};\n\ninterface {name}\n{{\n    public function handle(): void;\n}}\n")
    }

    /// Source with functions only.
    #[must_use]
    pub fn php_helpers_content() -> String {
        "<?php\n\nfunction acme_helper(string $value): string\n{\n    return $value;\n}\n"
            .to_string()
    }
}
