//! Manifest model and run options.
//!
//! Only the parts of `composer.json` that describe autoloading are modelled.
//! Section entries keep their declaration order, since validators run and
//! report in that order.

use crate::report::{Destination, Report, Severity};
use autolint_core::{Error, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Key holding exclusion globs inside an autoload section.
pub const EXCLUDE_FROM_CLASSMAP: &str = "exclude-from-classmap";

/// Autoload mechanism declared in a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoaderType {
    /// PSR-0 (namespace or PEAR-style prefixes).
    #[serde(rename = "psr-0")]
    Psr0,
    /// PSR-4 namespace prefixes.
    #[serde(rename = "psr-4")]
    Psr4,
    /// Scanned class map paths.
    #[serde(rename = "classmap")]
    ClassMap,
    /// Files included on every request.
    #[serde(rename = "files")]
    Files,
}

impl LoaderType {
    /// Key used in `composer.json`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Psr0 => "psr-0",
            Self::Psr4 => "psr-4",
            Self::ClassMap => "classmap",
            Self::Files => "files",
        }
    }

    /// Parse a loader key from `section`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLoaderType`] for anything else.
    pub fn parse(section: &str, key: &str) -> Result<Self> {
        match key {
            "psr-0" => Ok(Self::Psr0),
            "psr-4" => Ok(Self::Psr4),
            "classmap" => Ok(Self::ClassMap),
            "files" => Ok(Self::Files),
            other => Err(Error::unknown_loader_type(section, other)),
        }
    }
}

impl fmt::Display for LoaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathList {
    /// Single path.
    Single(String),
    /// Multiple paths.
    Multiple(Vec<String>),
}

impl PathList {
    /// Paths as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(p) => vec![p.clone()],
            Self::Multiple(ps) => ps.clone(),
        }
    }
}

/// Content of a loader entry as written in `composer.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DeclaredContent {
    /// A bare string.
    Path(String),
    /// An unkeyed list.
    List(Vec<String>),
    /// A keyed map, in declaration order.
    Map(OrderedPaths),
}

impl DeclaredContent {
    /// Prefix → paths pairs for PSR loaders.
    ///
    /// Unkeyed content gets its list indexes as prefixes (`"0"`, `"1"`, ...).
    #[must_use]
    pub fn prefixes(&self) -> Vec<(String, Vec<String>)> {
        match self {
            Self::Path(p) => vec![("0".to_string(), vec![p.clone()])],
            Self::List(ps) => ps
                .iter()
                .enumerate()
                .map(|(i, p)| (i.to_string(), vec![p.clone()]))
                .collect(),
            Self::Map(map) => map
                .0
                .iter()
                .map(|(prefix, paths)| (prefix.clone(), paths.to_vec()))
                .collect(),
        }
    }

    /// Plain path list for classmap and files loaders.
    ///
    /// # Errors
    /// Returns a config error for keyed content.
    pub fn paths(&self, key: &str) -> Result<Vec<String>> {
        match self {
            Self::Path(p) => Ok(vec![p.clone()]),
            Self::List(ps) => Ok(ps.clone()),
            Self::Map(_) => Err(Error::config_key(
                key,
                format!("'{key}' expects a list of paths, not an object"),
            )),
        }
    }
}

impl From<Vec<&str>> for DeclaredContent {
    fn from(paths: Vec<&str>) -> Self {
        Self::List(paths.into_iter().map(String::from).collect())
    }
}

impl From<Vec<(&str, &str)>> for DeclaredContent {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self::Map(OrderedPaths(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), PathList::Single(v.to_string())))
                .collect(),
        ))
    }
}

/// Prefix → paths map that keeps declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedPaths(pub Vec<(String, PathList)>);

impl<'de> Deserialize<'de> for OrderedPaths {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedPathsVisitor;

        impl<'de> Visitor<'de> for OrderedPathsVisitor {
            type Value = OrderedPaths;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of prefixes to paths")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((prefix, paths)) = map.next_entry::<String, PathList>()? {
                    entries.push((prefix, paths));
                }
                Ok(OrderedPaths(entries))
            }
        }

        deserializer.deserialize_map(OrderedPathsVisitor)
    }
}

/// An `autoload` or `autoload-dev` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoloadSection {
    /// Loader key → content, in declaration order.
    pub entries: Vec<(String, DeclaredContent)>,
    /// `exclude-from-classmap` globs.
    pub exclude_from_classmap: Vec<String>,
}

impl AutoloadSection {
    /// Append a loader entry.
    #[must_use]
    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        content: impl Into<DeclaredContent>,
    ) -> Self {
        self.entries.push((key.into(), content.into()));
        self
    }
}

impl<'de> Deserialize<'de> for AutoloadSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = AutoloadSection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an autoload section object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut section = AutoloadSection::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == EXCLUDE_FROM_CLASSMAP {
                        section
                            .exclude_from_classmap
                            .extend(map.next_value::<PathList>()?.to_vec());
                    } else {
                        let content = map.next_value::<DeclaredContent>().map_err(|e| {
                            de::Error::custom(format!("invalid content for '{key}': {e}"))
                        })?;
                        section.entries.push((key, content));
                    }
                }
                Ok(section)
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

/// The autoload-relevant parts of `composer.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComposerManifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Production autoload rules.
    #[serde(default)]
    pub autoload: Option<AutoloadSection>,
    /// Development autoload rules.
    #[serde(default, rename = "autoload-dev")]
    pub autoload_dev: Option<AutoloadSection>,
}

impl ComposerManifest {
    /// Parse manifest JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        autolint_core::from_json(json).map_err(|e| Error::invalid_manifest(e.to_string(), None))
    }

    /// Read and parse a `composer.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        autolint_core::from_json_slice(&bytes)
            .map_err(|e| Error::invalid_manifest(e.to_string(), Some(path.to_path_buf())))
    }

    /// Sections to validate, in order: `autoload`, then `autoload-dev`.
    pub fn sections(
        &self,
        include_dev: bool,
    ) -> impl Iterator<Item = (&'static str, &AutoloadSection)> {
        let dev = if include_dev {
            self.autoload_dev.as_ref()
        } else {
            None
        };
        self.autoload
            .as_ref()
            .map(|s| ("autoload", s))
            .into_iter()
            .chain(dev.map(|s| ("autoload-dev", s)))
    }
}

/// Parse `FROM=TO` or `FROM=silence`.
///
/// # Errors
/// Returns a config error for malformed input or unknown level names.
pub fn parse_severity_remap(value: &str) -> Result<(Severity, Option<Severity>)> {
    let (from, to) = value.split_once('=').ok_or_else(|| {
        Error::config_key("severity", format!("expected FROM=TO, got '{value}'"))
    })?;
    let from = from.parse::<Severity>()?;
    let to = if to.trim().eq_ignore_ascii_case("silence") {
        None
    } else {
        Some(to.parse::<Severity>()?)
    };
    Ok((from, to))
}

/// Options for a validation run.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Package root; declared paths resolve against it.
    pub base_dir: PathBuf,
    /// Exclusion regexes matched against absolute paths.
    pub exclude: Vec<String>,
    /// Severity remap table.
    pub severity_map: Vec<(Severity, Option<Severity>)>,
    /// Validate `autoload-dev` too.
    pub include_dev: bool,
}

impl ValidationOptions {
    /// Options for `base_dir` with defaults.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            exclude: Vec::new(),
            severity_map: Vec::new(),
            include_dev: true,
        }
    }

    /// Add exclusion regexes.
    #[must_use]
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Remap `from` to `to` (`None` silences).
    #[must_use]
    pub fn remap(mut self, from: Severity, to: Option<Severity>) -> Self {
        self.severity_map.push((from, to));
        self
    }

    /// Skip `autoload-dev`.
    #[must_use]
    pub fn without_dev(mut self) -> Self {
        self.include_dev = false;
        self
    }

    /// Report delivering to `destinations` with this run's severity remaps.
    #[must_use]
    pub fn build_report(&self, destinations: Vec<Box<dyn Destination>>) -> Report {
        Report::new(destinations).with_severity_map(self.severity_map.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"{
        "name": "acme/log-writer",
        "require": { "php": ">=8.1" },
        "autoload": {
            "psr-4": { "Acme\\Log\\": "src/", "Acme\\Util\\": ["util/", "lib/util/"] },
            "classmap": ["legacy/"],
            "files": ["src/helpers.php"],
            "exclude-from-classmap": ["/legacy/Tests/"]
        },
        "autoload-dev": {
            "psr-0": ["tests/"]
        }
    }"#;

    #[test]
    fn parses_sections_in_order() {
        let manifest = ComposerManifest::from_json(MANIFEST).unwrap();
        let autoload = manifest.autoload.as_ref().unwrap();

        let keys: Vec<_> = autoload.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["psr-4", "classmap", "files"]);
        assert_eq!(autoload.exclude_from_classmap, vec!["/legacy/Tests/"]);
        assert_eq!(manifest.name.as_deref(), Some("acme/log-writer"));
    }

    #[test]
    fn psr_map_keeps_prefix_order_and_lists() {
        let manifest = ComposerManifest::from_json(MANIFEST).unwrap();
        let (_, psr4) = &manifest.autoload.unwrap().entries[0];
        assert_eq!(
            psr4.prefixes(),
            vec![
                ("Acme\\Log\\".to_string(), vec!["src/".to_string()]),
                (
                    "Acme\\Util\\".to_string(),
                    vec!["util/".to_string(), "lib/util/".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn unkeyed_psr_list_gets_numeric_prefixes() {
        let manifest = ComposerManifest::from_json(MANIFEST).unwrap();
        let (_, psr0) = &manifest.autoload_dev.unwrap().entries[0];
        assert_eq!(psr0.prefixes(), vec![("0".to_string(), vec!["tests/".to_string()])]);
    }

    #[test]
    fn keyed_classmap_is_rejected() {
        let content = DeclaredContent::from(vec![("Foo", "src/")]);
        let err = content.paths("classmap").unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0102);
    }

    #[test]
    fn sections_respect_dev_flag() {
        let manifest = ComposerManifest::from_json(MANIFEST).unwrap();
        let names: Vec<_> = manifest.sections(true).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["autoload", "autoload-dev"]);
        let names: Vec<_> = manifest.sections(false).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["autoload"]);
    }

    #[test]
    fn manifest_without_autoload() {
        let manifest = ComposerManifest::from_json(r#"{"name":"acme/empty"}"#).unwrap();
        assert_eq!(manifest.sections(true).count(), 0);
    }

    #[test]
    fn null_loader_entry_is_an_invalid_manifest() {
        let err = ComposerManifest::from_json(
            r#"{"name":null,"autoload":{"psr-4":null,"exclude-from-classmap":null},"autoload-dev":null}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0201);
        assert!(err.to_string().contains("invalid content for 'psr-4'"));
    }

    #[test]
    fn null_optional_keys_are_absent() {
        let manifest =
            ComposerManifest::from_json(r#"{"name":null,"autoload":null,"autoload-dev":null}"#)
                .unwrap();
        assert_eq!(manifest, ComposerManifest::default());
    }

    #[test]
    fn omitted_loader_keys_parse() {
        let manifest =
            ComposerManifest::from_json(r#"{"autoload":{"classmap":["lib/"]}}"#).unwrap();
        let autoload = manifest.autoload.unwrap();
        assert_eq!(autoload.entries.len(), 1);
        assert!(autoload.exclude_from_classmap.is_empty());
        assert_eq!(manifest.autoload_dev, None);
    }

    #[test]
    fn invalid_manifest_is_reported() {
        let err = ComposerManifest::from_json("[1, 2").unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0201);
    }

    #[test]
    fn loader_type_parsing() {
        assert_eq!(LoaderType::parse("autoload", "psr-4").unwrap(), LoaderType::Psr4);
        let err = LoaderType::parse("autoload-dev", "psr-5").unwrap_err();
        assert!(err.to_string().contains("autoload-dev"));
    }

    #[test]
    fn severity_remap_parsing() {
        assert_eq!(
            parse_severity_remap("warning=error").unwrap(),
            (Severity::Warning, Some(Severity::Error))
        );
        assert_eq!(
            parse_severity_remap("Warning=SILENCE").unwrap(),
            (Severity::Warning, None)
        );
        assert!(parse_severity_remap("warning").is_err());
        assert!(parse_severity_remap("warning=").is_err());
        assert!(parse_severity_remap("=error").is_err());
    }
}
