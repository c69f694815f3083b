//! Autoload validators.
//!
//! One validator exists per declared loader entry (`autoload.psr-4`,
//! `autoload-dev.classmap`, ...). Each scans its declared paths, records the
//! classes it would provide and reports every mismatch between the declared
//! rules and the source tree.

mod classmap;
mod files;
mod psr0;
mod psr4;

pub use classmap::ClassMapValidator;
pub use files::FilesValidator;
pub use psr0::Psr0Validator;
pub use psr4::Psr4Validator;

use crate::classmap::ClassMap;
use crate::config::LoaderType;
use crate::loader::LoaderRuntime;
use crate::report::Report;
use crate::scanner::{ClassScanner, ScanResult, normalize_path};
use crate::violation::{Violation, ViolationKind};
use autolint_core::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// State shared by every validator variant.
#[derive(Debug)]
pub struct ValidatorBase {
    name: String,
    base_dir: PathBuf,
    scanner: Arc<dyn ClassScanner>,
    class_map: ClassMap,
    scan_warnings: Vec<String>,
    validated: bool,
}

impl ValidatorBase {
    /// Create the state for a `section.loader` validator rooted at `base_dir`.
    #[must_use]
    pub fn new(
        section: &str,
        loader_type: LoaderType,
        base_dir: impl Into<PathBuf>,
        scanner: Arc<dyn ClassScanner>,
    ) -> Self {
        Self {
            name: format!("{section}.{loader_type}"),
            base_dir: base_dir.into(),
            scanner,
            class_map: ClassMap::new(),
            scan_warnings: Vec::new(),
            validated: false,
        }
    }

    /// Validator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package root.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a declared path against the package root.
    #[must_use]
    pub fn resolve(&self, declared: &str) -> String {
        resolve_path(&normalize_path(&self.base_dir), declared)
    }

    /// Ambiguity warnings raised while scanning this validator's paths.
    #[must_use]
    pub fn scan_warnings(&self) -> &[String] {
        &self.scan_warnings
    }

    /// Scan `resolved`, keeping the scanner's warnings under this
    /// validator's name.
    fn scan(&mut self, resolved: &str, prefix: &str) -> Result<ClassMap> {
        let namespace = (!prefix.is_empty()).then_some(prefix);
        let ScanResult { classes, warnings } =
            self.scanner.scan(Path::new(resolved), None, namespace)?;
        for warning in warnings {
            warn!(validator = %self.name, "{warning}");
            self.scan_warnings.push(warning);
        }
        Ok(classes)
    }

    /// Merge scanned classes into the validator's map.
    ///
    /// A class already provided by another of this validator's files keeps
    /// its first file and is reported.
    fn absorb(&mut self, scanned: &ClassMap, report: &mut Report) -> Result<()> {
        for (class, file) in scanned {
            if !self.class_map.has(class) {
                self.class_map.add(class, file)?;
                continue;
            }
            let existing = self.class_map.file_for(class)?;
            if existing != file {
                let files = vec![
                    (self.name.clone(), existing.display().to_string()),
                    (self.name.clone(), file.display().to_string()),
                ];
                report.error(Violation::new(
                    self.name.clone(),
                    ViolationKind::ClassAddedMoreThanOnce {
                        class_name: class.to_string(),
                        files,
                    },
                ))?;
            }
        }
        Ok(())
    }

    fn violation(&self, kind: ViolationKind) -> Violation {
        Violation::new(self.name.clone(), kind)
    }
}

/// A validator for one declared loader entry.
pub trait Validator: fmt::Debug {
    /// Shared state.
    fn base(&self) -> &ValidatorBase;

    /// Shared state, mutably.
    fn base_mut(&mut self) -> &mut ValidatorBase;

    /// The loader type this validator checks.
    fn loader_type(&self) -> LoaderType;

    /// Run the checks. Called at most once through [`Validator::validate`].
    fn do_validate(&mut self, report: &mut Report) -> Result<()>;

    /// Install the validator's rules into a live loader runtime.
    fn register(&mut self, runtime: &mut dyn LoaderRuntime, report: &mut Report) -> Result<()>;

    /// `section.loader-type`, e.g. `autoload.psr-4`.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Validate, once. Later calls are no-ops.
    fn validate(&mut self, report: &mut Report) -> Result<()> {
        if self.base().validated {
            return Ok(());
        }
        debug!(validator = self.name(), "validating");
        self.do_validate(report)?;
        self.base_mut().validated = true;
        Ok(())
    }

    /// Ambiguity warnings from this validator's scans.
    fn scan_warnings(&self) -> &[String] {
        self.base().scan_warnings()
    }

    /// Classes this validator provides, validating first if needed.
    fn class_map(&mut self, report: &mut Report) -> Result<&ClassMap> {
        self.validate(report)?;
        Ok(&self.base().class_map)
    }
}

/// Join `base` and `sub` with `/`, collapsing repeated separators.
#[must_use]
pub fn resolve_path(base: &str, sub: &str) -> String {
    let joined = format!("{base}/{sub}");
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Split a class into `(namespace, bare name)` on the last `\`.
#[must_use]
pub fn split_class(class: &str) -> (&str, &str) {
    let class = class.strip_prefix('\\').unwrap_or(class);
    class.rsplit_once('\\').unwrap_or(("", class))
}

/// Prefix produced by an unkeyed list entry.
fn is_numeric_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit())
}

/// Path without its extension.
fn strip_extension(path: &str) -> &str {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// Extension of `path`, including the dot.
fn extension(path: &str) -> &str {
    &path[strip_extension(path).len()..]
}

/// Compare `actual` with `expected` (no extension); `None` when they
/// match, otherwise the expected file with the actual extension.
fn misplaced(actual: &Path, expected: &str) -> Option<(String, String)> {
    let actual = normalize_path(actual);
    if strip_extension(&actual) == expected {
        None
    } else {
        let should = format!("{expected}{}", extension(&actual));
        Some((actual, should))
    }
}
