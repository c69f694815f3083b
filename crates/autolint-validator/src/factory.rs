//! Builds validators from declared autoload entries.

use crate::config::{ComposerManifest, DeclaredContent, LoaderType, ValidationOptions};
use crate::scanner::{ClassScanner, ExcludePattern, Scanner};
use crate::validator::{
    ClassMapValidator, FilesValidator, Psr0Validator, Psr4Validator, Validator,
};
use autolint_core::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Creates validators sharing one base directory and scanner.
#[derive(Debug, Clone)]
pub struct ValidatorFactory {
    base_dir: PathBuf,
    scanner: Arc<dyn ClassScanner>,
}

impl ValidatorFactory {
    /// Create a factory for `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, scanner: Arc<dyn ClassScanner>) -> Self {
        Self {
            base_dir: base_dir.into(),
            scanner,
        }
    }

    /// Create a factory whose scanner honours the run's exclusion regexes
    /// and every `exclude-from-classmap` glob of the validated sections.
    ///
    /// # Errors
    /// Returns a config error for an invalid pattern.
    pub fn for_manifest(manifest: &ComposerManifest, options: &ValidationOptions) -> Result<Self> {
        let mut exclude = ExcludePattern::from_regexes(&options.exclude)?;
        for (name, section) in manifest.sections(options.include_dev) {
            if section.exclude_from_classmap.is_empty() {
                continue;
            }
            debug!(
                section = name,
                patterns = section.exclude_from_classmap.len(),
                "exclude-from-classmap"
            );
            exclude.extend(ExcludePattern::from_globs(
                &options.base_dir,
                &section.exclude_from_classmap,
            )?);
        }
        Ok(Self::new(
            options.base_dir.clone(),
            Arc::new(Scanner::new(exclude)),
        ))
    }

    /// Create the validator for `loader_type` in `section`.
    ///
    /// # Errors
    /// Returns [`autolint_core::Error::UnknownLoaderType`] for unsupported
    /// loader types, and a config error for malformed content.
    pub fn create_validator(
        &self,
        section: &str,
        loader_type: &str,
        content: &DeclaredContent,
    ) -> Result<Box<dyn Validator>> {
        let base_dir = self.base_dir.clone();
        let scanner = Arc::clone(&self.scanner);
        let validator: Box<dyn Validator> = match LoaderType::parse(section, loader_type)? {
            LoaderType::Psr0 => Box::new(Psr0Validator::new(section, base_dir, scanner, content)),
            LoaderType::Psr4 => Box::new(Psr4Validator::new(section, base_dir, scanner, content)),
            LoaderType::ClassMap => {
                Box::new(ClassMapValidator::new(section, base_dir, scanner, content)?)
            }
            LoaderType::Files => {
                Box::new(FilesValidator::new(section, base_dir, scanner, content)?)
            }
        };
        debug!(validator = validator.name(), "created validator");
        Ok(validator)
    }

    /// One validator per loader entry: `autoload` first, then
    /// `autoload-dev`, each in declaration order.
    pub fn from_manifest(
        &self,
        manifest: &ComposerManifest,
        include_dev: bool,
    ) -> Result<Vec<Box<dyn Validator>>> {
        let mut validators = Vec::new();
        let mut sections = 0;

        for (name, section) in manifest.sections(include_dev) {
            sections += 1;
            for (loader_type, content) in &section.entries {
                validators.push(self.create_validator(name, loader_type, content)?);
            }
        }

        if sections == 0 {
            info!("no autoload or autoload-dev section, nothing to validate");
        }
        Ok(validators)
    }
}
