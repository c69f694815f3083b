//! Source scanner using walkdir.
//!
//! Walks a file or directory, reads each PHP source and maps the declared
//! classes to the file declaring them.

use crate::classmap::ClassMap;
use crate::parser::PhpFileParser;
use autolint_core::{Error, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Source extensions picked up when walking directories.
pub const PHP_EXTENSIONS: &[&str] = &["php", "inc", "hh"];

/// Paths where duplicate classes are expected and not worth a warning.
static TEST_LIKE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:test|fixture|example|stub)s?/").unwrap());

/// `/`-separated form of a path, used for every pattern match.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Exclude patterns for files/directories.
#[derive(Debug, Clone, Default)]
pub struct ExcludePattern {
    patterns: Vec<Regex>,
}

impl ExcludePattern {
    /// Compile regexes matched against normalized absolute paths.
    ///
    /// # Errors
    /// Returns a config error naming the first invalid pattern.
    pub fn from_regexes<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()).map_err(|e| Error::invalid_pattern(p.as_ref(), e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Convert `exclude-from-classmap` globs, relative to `base_dir`.
    ///
    /// `**` matches at any depth, `*` within one segment and `?` one
    /// character. Patterns match as prefixes, so `/Tests/` excludes the
    /// whole directory.
    pub fn from_globs<S: AsRef<str>>(base_dir: &Path, globs: &[S]) -> Result<Self> {
        let base = normalize_path(base_dir);
        let base = regex::escape(base.trim_end_matches('/'));
        let regexes: Vec<String> = globs
            .iter()
            .map(|glob| format!("^{base}/{}", glob_to_regex(glob.as_ref())))
            .collect();
        Self::from_regexes(&regexes)
    }

    /// Add the patterns of `other`.
    pub fn extend(&mut self, other: Self) {
        self.patterns.extend(other.patterns);
    }

    /// Check if path should be excluded.
    #[must_use]
    pub fn should_exclude(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let normalized = normalize_path(path);
        self.patterns.iter().any(|p| p.is_match(&normalized))
    }

    /// Whether no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn glob_to_regex(glob: &str) -> String {
    let glob = glob.trim_start_matches("./").trim_start_matches('/');
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '\\' => out.push('/'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

/// Classes found by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Class → declaring file.
    pub classes: ClassMap,
    /// Ambiguity warnings.
    pub warnings: Vec<String>,
}

/// Anything able to map a path to the classes declared beneath it.
pub trait ClassScanner: fmt::Debug {
    /// Scan a file or directory.
    ///
    /// `whitelist` must match a file's path for it to be read; `namespace`
    /// keeps only classes starting with that literal prefix.
    fn scan(
        &self,
        path: &Path,
        whitelist: Option<&Regex>,
        namespace: Option<&str>,
    ) -> Result<ScanResult>;
}

/// Filesystem scanner.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    exclude: ExcludePattern,
}

impl Scanner {
    /// Create a new scanner with exclude patterns.
    #[must_use]
    pub fn new(exclude: ExcludePattern) -> Self {
        Self { exclude }
    }

    /// Check if a path has a scanned source extension.
    #[must_use]
    pub fn is_php_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| PHP_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
    }

    /// Classes declared in one file, in file order.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be read and a scan error for
    /// binary content.
    pub fn scan_file(path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        if memchr::memchr(0, &bytes).is_some() {
            return Err(Error::scan(path, "binary content (NUL byte)"));
        }
        let content = String::from_utf8_lossy(&bytes);
        Ok(PhpFileParser::find_classes(&content))
    }

    fn candidate_files(&self, root: &Path, whitelist: Option<&Regex>) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(root).map_err(|e| Error::io(root, e))?;

        let files = if metadata.is_file() {
            vec![root.to_path_buf()]
        } else {
            let mut files = Vec::new();
            for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let message = e.to_string();
                    match e.into_io_error() {
                        Some(io) => Error::io(path, io),
                        None => Error::scan(path, message),
                    }
                })?;
                if entry.file_type().is_file() && Self::is_php_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            files
        };

        Ok(files
            .into_iter()
            .filter(|path| {
                let excluded = self.exclude.should_exclude(path);
                if excluded {
                    trace!(path = %path.display(), "excluded");
                }
                !excluded
            })
            .filter(|path| whitelist.is_none_or(|w| w.is_match(&normalize_path(path))))
            .collect())
    }
}

impl ClassScanner for Scanner {
    fn scan(
        &self,
        path: &Path,
        whitelist: Option<&Regex>,
        namespace: Option<&str>,
    ) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        let files = self.candidate_files(path, whitelist)?;
        let file_count = files.len();

        for file in files {
            for class in Self::scan_file(&file)? {
                if namespace.is_some_and(|ns| !class.starts_with(ns)) {
                    continue;
                }

                if !result.classes.has(&class) {
                    result.classes.add(&class, file.clone())?;
                    continue;
                }

                let existing = result.classes.file_for(&class)?;
                if existing == file {
                    continue;
                }
                let first = normalize_path(existing);
                let second = normalize_path(&file);
                if !TEST_LIKE_PATH.is_match(&first) && !TEST_LIKE_PATH.is_match(&second) {
                    debug!(%class, %first, %second, "ambiguous class resolution");
                    result.warnings.push(format!(
                        "Ambiguous class resolution, \"{class}\" was found in both \
                         \"{first}\" and \"{second}\", the first will be used."
                    ));
                }
            }
        }

        debug!(
            path = %path.display(),
            files = file_count,
            classes = result.classes.len(),
            "scan complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn scans_directory_in_name_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b/B.php", "<?php class B {}");
        write(temp.path(), "a/A.php", "<?php class A {}");
        write(temp.path(), "a/readme.txt", "<?php class NotScanned {}");

        let result = Scanner::default().scan(temp.path(), None, None).unwrap();
        let classes: Vec<_> = result.classes.classes().collect();
        assert_eq!(classes, vec!["A", "B"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn scans_single_file() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "Single.php", "<?php namespace X; class Single {}");

        let result = Scanner::default().scan(&file, None, None).unwrap();
        assert_eq!(result.classes.file_for("X\\Single").unwrap(), file.as_path());
    }

    #[test]
    fn namespace_filter_is_literal_prefix() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "A.php", "<?php namespace Acme; class A {}");
        write(temp.path(), "B.php", "<?php namespace Other; class B {}");

        let result = Scanner::default()
            .scan(temp.path(), None, Some("Acme\\"))
            .unwrap();
        assert_eq!(result.classes.classes().collect::<Vec<_>>(), vec!["Acme\\A"]);
    }

    #[test]
    fn exclusions_remove_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/A.php", "<?php class A {}");
        write(temp.path(), "src/Tests/ATest.php", "<?php class ATest {}");

        let exclude = ExcludePattern::from_regexes(&["/Tests/"]).unwrap();
        let result = Scanner::new(exclude).scan(temp.path(), None, None).unwrap();
        assert!(result.classes.has("A"));
        assert!(!result.classes.has("ATest"));
    }

    #[test]
    fn whitelist_restricts_paths() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "keep/A.php", "<?php class A {}");
        write(temp.path(), "drop/B.php", "<?php class B {}");

        let whitelist = Regex::new("/keep/").unwrap();
        let result = Scanner::default()
            .scan(temp.path(), Some(&whitelist), None)
            .unwrap();
        assert_eq!(result.classes.len(), 1);
        assert!(result.classes.has("A"));
    }

    #[test]
    fn ambiguous_class_warns_once_and_keeps_first() {
        let temp = TempDir::new().unwrap();
        let first = write(temp.path(), "other/A.php", "<?php class A {}");
        write(temp.path(), "src/A.php", "<?php class A {}");

        let result = Scanner::default().scan(temp.path(), None, None).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("other/A.php"));
        assert!(result.warnings[0].contains("src/A.php"));
        assert_eq!(result.classes.file_for("A").unwrap(), first.as_path());
    }

    #[test]
    fn ambiguity_in_test_paths_is_silent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/A.php", "<?php class A {}");
        write(temp.path(), "src/test/A.php", "<?php class A {}");
        write(temp.path(), "src/Fixtures/A.php", "<?php class A {}");

        let result = Scanner::default().scan(temp.path(), None, None).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.classes.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = Scanner::default()
            .scan(&temp.path().join("missing"), None, None)
            .unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0401);
    }

    #[test]
    fn binary_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.php");
        fs::write(&path, b"<?php \0\x01class X {}").unwrap();

        let err = Scanner::default().scan(temp.path(), None, None).unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0403);
    }

    #[test]
    fn empty_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Empty.php", "");

        let result = Scanner::default().scan(temp.path(), None, None).unwrap();
        assert!(result.classes.is_empty());
    }

    #[test]
    fn globs_are_anchored_to_base_dir() {
        let base = Path::new("/app");
        let exclude =
            ExcludePattern::from_globs(base, &["src/Tests/", "lib/**/Fixture*.php", "/build/?.php"])
                .unwrap();

        assert!(exclude.should_exclude(Path::new("/app/src/Tests/FooTest.php")));
        assert!(exclude.should_exclude(Path::new("/app/lib/a/b/FixtureOne.php")));
        assert!(exclude.should_exclude(Path::new("/app/build/x.php")));
        assert!(!exclude.should_exclude(Path::new("/app/build/xy.php")));
        assert!(!exclude.should_exclude(Path::new("/other/src/Tests/FooTest.php")));
        assert!(!exclude.should_exclude(Path::new("/app/lib/Fixture.txt")));
    }

    #[test]
    fn single_star_stays_in_segment() {
        let exclude = ExcludePattern::from_globs(Path::new("/app"), &["src/*/Tests/"]).unwrap();
        assert!(exclude.should_exclude(Path::new("/app/src/Foo/Tests/T.php")));
        assert!(!exclude.should_exclude(Path::new("/app/src/Foo/Bar/Tests/T.php")));
    }

    #[test]
    fn invalid_regex_is_a_config_error() {
        let err = ExcludePattern::from_regexes(&["(unclosed"]).unwrap_err();
        assert_eq!(err.code(), autolint_core::ErrorCode::E0103);
    }
}
