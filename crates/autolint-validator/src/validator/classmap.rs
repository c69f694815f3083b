use super::{Validator, ValidatorBase};
use crate::config::{DeclaredContent, LoaderType};
use crate::loader::LoaderRuntime;
use crate::report::Report;
use crate::scanner::ClassScanner;
use crate::violation::ViolationKind;
use autolint_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Validates `classmap` entries: every declared path must provide classes.
#[derive(Debug)]
pub struct ClassMapValidator {
    base: ValidatorBase,
    paths: Vec<String>,
}

impl ClassMapValidator {
    /// Create a validator for the `classmap` entry of `section`.
    ///
    /// # Errors
    /// Returns a config error when the content is not a path list.
    pub fn new(
        section: &str,
        base_dir: impl Into<PathBuf>,
        scanner: Arc<dyn ClassScanner>,
        content: &DeclaredContent,
    ) -> Result<Self> {
        Ok(Self {
            base: ValidatorBase::new(section, LoaderType::ClassMap, base_dir, scanner),
            paths: content.paths(LoaderType::ClassMap.as_str())?,
        })
    }
}

impl Validator for ClassMapValidator {
    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ValidatorBase {
        &mut self.base
    }

    fn loader_type(&self) -> LoaderType {
        LoaderType::ClassMap
    }

    fn do_validate(&mut self, report: &mut Report) -> Result<()> {
        for entry in &self.paths {
            let resolved = self.base.resolve(entry);
            let scanned = self.base.scan(&resolved, "")?;

            if scanned.is_empty() {
                report.error(self.base.violation(ViolationKind::NoClassesFoundInPath {
                    loader: LoaderType::ClassMap,
                    prefix: entry.clone(),
                    path: resolved,
                }))?;
                continue;
            }

            self.base.absorb(&scanned, report)?;
        }
        Ok(())
    }

    fn register(&mut self, runtime: &mut dyn LoaderRuntime, report: &mut Report) -> Result<()> {
        let map = self.class_map(report)?;
        runtime.class_loader().add_class_map(map);
        Ok(())
    }
}
