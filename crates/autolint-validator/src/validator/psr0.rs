use super::{Validator, ValidatorBase, is_numeric_prefix, misplaced, split_class};
use crate::config::{DeclaredContent, LoaderType};
use crate::loader::{ClassLoader, LoaderRuntime};
use crate::report::Report;
use crate::scanner::ClassScanner;
use crate::violation::ViolationKind;
use autolint_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Validates `psr-0` entries.
///
/// Prefixes may be namespaces (`Acme\Log\`), PEAR-style (`Acme_Log_`) or a
/// full class name. Underscores in the class name segment map to
/// directories.
#[derive(Debug)]
pub struct Psr0Validator {
    base: ValidatorBase,
    prefixes: Vec<(String, Vec<String>)>,
}

impl Psr0Validator {
    /// Create a validator for the `psr-0` entry of `section`.
    pub fn new(
        section: &str,
        base_dir: impl Into<PathBuf>,
        scanner: Arc<dyn ClassScanner>,
        content: &DeclaredContent,
    ) -> Self {
        Self {
            base: ValidatorBase::new(section, LoaderType::Psr0, base_dir, scanner),
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

        let mut classes = self.base.scan(&path, prefix)?;
        if classes.is_empty() {
            report.error(self.base.violation(ViolationKind::NoClassesFoundInPath {
                loader: LoaderType::Psr0,
                prefix: prefix.to_string(),
                path,
            }))?;
            return Ok(());
        }

        if !prefix.is_empty()
            && prefix.contains('\\')
            && !prefix.ends_with('\\')
            && !prefix.ends_with('_')
            && !classes.has(prefix)
        {
            report.warn(self.base.violation(ViolationKind::NamespaceShouldEndWithBackslash {
                prefix: prefix.to_string(),
                path: path.clone(),
            }))?;
        }

        let namespace_prefix = prefix.trim_end_matches('\\');
        let found: Vec<(String, PathBuf)> = classes
            .iter()
            .map(|(class, file)| (class.to_string(), file.to_path_buf()))
            .collect();

        for (class, file) in found {
            let (namespace, bare) = split_class(&class);

            if !namespace.is_empty()
                && !namespace.starts_with(namespace_prefix)
                && class != prefix
            {
                classes.remove(&class)?;
                report.error(self.base.violation(ViolationKind::NamespacePrefixMismatch {
                    prefix: prefix.to_string(),
                    path: path.clone(),
                    class: class.clone(),
                    namespace: namespace.to_string(),
                }))?;
                continue;
            }

            let mut expected = format!("{path}/");
            if !namespace.is_empty() {
                expected.push_str(&namespace.replace('\\', "/"));
                expected.push('/');
            }
            expected.push_str(&bare.replace('_', "/"));

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

impl Validator for Psr0Validator {
    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ValidatorBase {
        &mut self.base
    }

    fn loader_type(&self) -> LoaderType {
        LoaderType::Psr0
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

        let mut loader = ClassLoader::new();
        for (prefix, paths) in &self.prefixes {
            if is_numeric_prefix(prefix) {
                continue;
            }
            let dirs = paths
                .iter()
                .map(|p| PathBuf::from(self.base.resolve(p)))
                .collect();
            loader.add_psr0(prefix, dirs);
        }

        runtime.register(Box::new(move |class: &str| loader.find_file(class)));
        Ok(())
    }
}
