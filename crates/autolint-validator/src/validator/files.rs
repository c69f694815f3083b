use super::{Validator, ValidatorBase};
use crate::config::{DeclaredContent, LoaderType};
use crate::loader::{LoaderFn, LoaderRuntime};
use crate::report::Report;
use crate::scanner::ClassScanner;
use crate::violation::ViolationKind;
use autolint_core::{AHashSet, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Validates `files` entries: every declared file must exist.
///
/// Files provide no class map. Registering includes them and folds the
/// loader callbacks they install into a single callback.
#[derive(Debug)]
pub struct FilesValidator {
    base: ValidatorBase,
    files: Vec<String>,
}

impl FilesValidator {
    /// Create a validator for the `files` entry of `section`.
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
            base: ValidatorBase::new(section, LoaderType::Files, base_dir, scanner),
            files: content.paths(LoaderType::Files.as_str())?,
        })
    }
}

impl Validator for FilesValidator {
    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ValidatorBase {
        &mut self.base
    }

    fn loader_type(&self) -> LoaderType {
        LoaderType::Files
    }

    fn do_validate(&mut self, report: &mut Report) -> Result<()> {
        for entry in &self.files {
            if !Path::new(&self.base.resolve(entry)).is_file() {
                report.error(self.base.violation(ViolationKind::FileNotFound {
                    file_entry: entry.clone(),
                }))?;
            }
        }
        Ok(())
    }

    fn register(&mut self, runtime: &mut dyn LoaderRuntime, report: &mut Report) -> Result<()> {
        self.validate(report)?;

        let before: AHashSet<_> = runtime.registered().into_iter().collect();
        for entry in &self.files {
            let path = PathBuf::from(self.base.resolve(entry));
            if path.is_file() {
                runtime.include_file(&path)?;
            }
        }

        let added: Vec<_> = runtime
            .registered()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();
        let loaders: Vec<LoaderFn> = added
            .into_iter()
            .filter_map(|id| runtime.unregister(id))
            .collect();

        debug!(validator = self.name(), callbacks = loaders.len(), "captured file loaders");
        if !loaders.is_empty() {
            runtime.register(Box::new(move |class: &str| {
                loaders.iter().find_map(|loader| loader(class))
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CallbackRegistry;
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn validator(base: &Path, files: Vec<&str>) -> FilesValidator {
        FilesValidator::new(
            "autoload",
            base,
            Arc::new(Scanner::default()),
            &DeclaredContent::from(files),
        )
        .unwrap()
    }

    #[test]
    fn missing_file_is_reported_with_declared_entry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("helpers.php"), "<?php function h() {}").unwrap();

        let mut report = Report::default();
        let mut v = validator(temp.path(), vec!["helpers.php", "src/missing.php"]);
        v.validate(&mut report).unwrap();

        assert_eq!(report.errors().len(), 1);
        assert_eq!(
            report.errors()[0].message(),
            "[autoload.files] File \"src/missing.php\" does not exist."
        );
        assert!(v.class_map(&mut report).unwrap().is_empty());
    }

    #[test]
    fn directory_is_not_a_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();

        let mut report = Report::default();
        validator(temp.path(), vec!["src"]).validate(&mut report).unwrap();
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn register_folds_new_callbacks_into_one() {
        let temp = TempDir::new().unwrap();
        let bootstrap = temp.path().join("bootstrap.php");
        fs::write(&bootstrap, "<?php spl_autoload_register(...);").unwrap();

        let mut runtime = CallbackRegistry::new();
        let existing = runtime.register(Box::new(|_: &str| None));
        runtime.on_include(
            PathBuf::from(format!("{}/bootstrap.php", temp.path().display())),
            Box::new(|class: &str| (class == "A").then(|| PathBuf::from("/a.php"))),
        );
        runtime.on_include(
            PathBuf::from(format!("{}/bootstrap.php", temp.path().display())),
            Box::new(|class: &str| (class == "B").then(|| PathBuf::from("/b.php"))),
        );

        let mut report = Report::default();
        validator(temp.path(), vec!["bootstrap.php"])
            .register(&mut runtime, &mut report)
            .unwrap();

        let registered = runtime.registered();
        assert_eq!(registered.len(), 2);
        assert_eq!(registered[0], existing);
        assert_eq!(runtime.resolve("A"), Some(PathBuf::from("/a.php")));
        assert_eq!(runtime.resolve("B"), Some(PathBuf::from("/b.php")));
        assert_eq!(runtime.included().len(), 1);
    }
}
