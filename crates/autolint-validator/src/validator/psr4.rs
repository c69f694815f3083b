use super::{Validator, ValidatorBase, is_numeric_prefix, misplaced, split_class};
use crate::config::{DeclaredContent, LoaderType};
use crate::loader::LoaderRuntime;
use crate::report::Report;
use crate::scanner::ClassScanner;
use crate::violation::ViolationKind;
use autolint_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Validates `psr-4` entries.
///
/// Every non-empty prefix must end with `\`. The class name after the
/// prefix maps to a path below the declared directory; underscores are
/// plain characters.
#[derive(Debug)]
pub struct Psr4Validator {
    base: ValidatorBase,
    prefixes: Vec<(String, Vec<String>)>,
}

fn is_valid_prefix(prefix: &str) -> bool {
    !is_numeric_prefix(prefix) && (prefix.is_empty() || prefix.ends_with('\\'))
}

impl Psr4Validator {
    /// Create a validator for the `psr-4` entry of `section`.
    pub fn new(
        section: &str,
        base_dir: impl Into<PathBuf>,
        scanner: Arc<dyn ClassScanner>,
        content: &DeclaredContent,
    ) -> Self {
        Self {
            base: ValidatorBase::new(section, LoaderType::Psr4, base_dir, scanner),
            prefixes: content.prefixes(),
        }
    }

    fn check(&mut self, prefix: &str, declared: &str, report: &mut Report) -> Result<()> {
        let path = self.base.resolve(declared);

        if is_numeric_prefix(prefix) {
            report.error(self.base.violation(ViolationKind::NameSpaceInvalid {
                prefix: prefix.to_string(),
                path,
            }))?;
            return Ok(());
        }

        if !prefix.is_empty() && !prefix.ends_with('\\') {
            report.error(self.base.violation(ViolationKind::NamespaceMustEndWithBackslash {
                prefix: prefix.to_string(),
                path,
            }))?;
            return Ok(());
        }

        let mut classes = self.base.scan(&path, prefix)?;
        if classes.is_empty() {
            report.error(self.base.violation(ViolationKind::NoClassesFoundInPath {
                loader: LoaderType::Psr4,
                prefix: prefix.to_string(),
                path,
            }))?;
            return Ok(());
        }

        let found: Vec<(String, PathBuf)> = classes
            .iter()
            .map(|(class, file)| (class.to_string(), file.to_path_buf()))
            .collect();

        for (class, file) in found {
            let Some(relative) = class.strip_prefix(prefix) else {
                classes.remove(&class)?;
                report.error(self.base.violation(ViolationKind::NamespacePrefixMismatch {
                    prefix: prefix.to_string(),
                    path: path.clone(),
                    class: class.clone(),
                    namespace: split_class(&class).0.to_string(),
                }))?;
                continue;
            };

            let expected = format!("{path}/{}", relative.replace('\\', "/"));
            if let Some((file_is, file_should)) = misplaced(&file, &expected) {
                classes.remove(&class)?;
                report.error(self.base.violation(ViolationKind::ClassFoundInWrongFile {
                    prefix: prefix.to_string(),
                    path: path.clone(),
                    class: class.clone(),
                    file_is,
                    file_should,
                }))?;
            }
        }

        self.base.absorb(&classes, report)
    }
}

impl Validator for Psr4Validator {
    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ValidatorBase {
        &mut self.base
    }

    fn loader_type(&self) -> LoaderType {
        LoaderType::Psr4
    }

    fn do_validate(&mut self, report: &mut Report) -> Result<()> {
        for (prefix, paths) in self.prefixes.clone() {
            for declared in &paths {
                self.check(&prefix, declared, report)?;
            }
        }
        Ok(())
    }

    fn register(&mut self, runtime: &mut dyn LoaderRuntime, report: &mut Report) -> Result<()> {
        self.validate(report)?;

        let loader = runtime.class_loader();
        for (prefix, paths) in &self.prefixes {
            if !is_valid_prefix(prefix) {
                continue;
            }
            let dirs = paths
                .iter()
                .map(|p| PathBuf::from(self.base.resolve(p)))
                .collect();
            loader.add_psr4(prefix, dirs)?;
        }
        Ok(())
    }
}
