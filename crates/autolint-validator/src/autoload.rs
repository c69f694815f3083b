//! Runs every validator of a package and merges their class maps.

use crate::classmap::ClassMap;
use crate::config::{ComposerManifest, ValidationOptions};
use crate::factory::ValidatorFactory;
use crate::loader::LoaderRuntime;
use crate::report::Report;
use crate::validator::Validator;
use crate::violation::{Violation, ViolationKind};
use autolint_core::{AHashMap, Result};
use tracing::{debug, info};

/// Ordered set of validators sharing one report.
#[derive(Debug, Default)]
pub struct AutoloadValidator {
    validators: Vec<Box<dyn Validator>>,
    report: Report,
    class_map: Option<ClassMap>,
}

impl AutoloadValidator {
    /// Create an empty aggregate reporting into `report`.
    #[must_use]
    pub fn new(report: Report) -> Self {
        Self {
            validators: Vec::new(),
            report,
            class_map: None,
        }
    }

    /// Build validators for every loader entry of `manifest`.
    ///
    /// # Errors
    /// Returns a config error for unknown loader types, malformed content
    /// or invalid exclusion patterns.
    pub fn from_manifest(
        manifest: &ComposerManifest,
        options: &ValidationOptions,
        report: Report,
    ) -> Result<Self> {
        let factory = ValidatorFactory::for_manifest(manifest, options)?;
        let mut aggregate = Self::new(report);
        for validator in factory.from_manifest(manifest, options.include_dev)? {
            aggregate.add(validator);
        }
        Ok(aggregate)
    }

    /// Append a validator.
    pub fn add(&mut self, validator: Box<dyn Validator>) {
        self.class_map = None;
        self.validators.push(validator);
    }

    /// Validators in run order.
    #[must_use]
    pub fn validators(&self) -> &[Box<dyn Validator>] {
        &self.validators
    }

    /// The shared report.
    #[must_use]
    pub const fn report(&self) -> &Report {
        &self.report
    }

    /// Consume the aggregate, keeping the report.
    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Scanner ambiguity warnings as `(validator, message)`, in run order.
    pub fn scan_warnings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.validators.iter().flat_map(|validator| {
            let name = validator.name();
            validator
                .scan_warnings()
                .iter()
                .map(move |warning| (name, warning.as_str()))
        })
    }

    /// Validate every validator, in order.
    pub fn validate(&mut self) -> Result<()> {
        for validator in &mut self.validators {
            validator.validate(&mut self.report)?;
        }
        Ok(())
    }

    /// Merged class map of all validators.
    ///
    /// The first validator to provide a class keeps it. Classes provided by
    /// more than one validator are reported once each.
    pub fn class_map(&mut self) -> Result<&ClassMap> {
        if self.class_map.is_none() {
            let merged = self.merge()?;
            self.class_map = Some(merged);
        }
        Ok(self.class_map.get_or_insert_with(ClassMap::new))
    }

    fn merge(&mut self) -> Result<ClassMap> {
        let mut merged = ClassMap::new();
        let mut owners: AHashMap<String, Vec<(String, String)>> = AHashMap::new();
        let mut order = Vec::new();

        for validator in &mut self.validators {
            let name = validator.name().to_string();
            for (class, file) in validator.class_map(&mut self.report)? {
                let claims = owners.entry(class.to_string()).or_insert_with(|| {
                    order.push(class.to_string());
                    Vec::new()
                });
                if !claims.iter().any(|(owner, _)| *owner == name) {
                    claims.push((name.clone(), file.display().to_string()));
                }
                if !merged.has(class) {
                    merged.add(class, file)?;
                }
            }
        }

        for class in order {
            let Some(files) = owners.remove(&class) else {
                continue;
            };
            if files.len() < 2 {
                continue;
            }
            let names = files
                .iter()
                .map(|(owner, _)| owner.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            debug!(class = %class, validators = %names, "class provided more than once");
            self.report.error(Violation::new(
                names,
                ViolationKind::ClassAddedMoreThanOnce {
                    class_name: class,
                    files,
                },
            ))?;
        }

        info!(classes = merged.len(), validators = self.validators.len(), "class map merged");
        Ok(merged)
    }

    /// Register every validator into `runtime`, in order.
    pub fn register(&mut self, runtime: &mut dyn LoaderRuntime) -> Result<()> {
        for validator in &mut self.validators {
            validator.register(runtime, &mut self.report)?;
        }
        Ok(())
    }
}
