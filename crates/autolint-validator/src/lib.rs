//! Composer autoload consistency validation.
//!
//! Checks that the autoload rules declared in `composer.json` agree with the
//! source tree:
//! - **PSR-4 / PSR-0**: every class lives where its prefix says it should
//! - **Classmap**: every declared path provides classes
//! - **Files**: every declared file exists
//! - **Aggregate**: no class is provided by more than one loader entry
//!
//! Classes are discovered statically by [`PhpFileParser`]; PHP is never
//! executed. Findings are [`Violation`]s collected in a [`Report`].
//!
//! # Example
//!
//! ```no_run
//! use autolint_validator::{AutoloadValidator, ComposerManifest, Report, ValidationOptions};
//! use std::path::Path;
//!
//! let manifest = ComposerManifest::from_file(Path::new("composer.json"))?;
//! let options = ValidationOptions::new(".");
//! let mut validator = AutoloadValidator::from_manifest(&manifest, &options, Report::default())?;
//! validator.validate()?;
//! validator.class_map()?;
//! assert!(!validator.report().is_failure());
//! # Ok::<(), autolint_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod autoload;
pub mod classmap;
pub mod config;
pub mod factory;
pub mod loader;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod validator;
pub mod violation;

pub use autoload::AutoloadValidator;
pub use classmap::ClassMap;
pub use config::{
    AutoloadSection, ComposerManifest, DeclaredContent, LoaderType, ValidationOptions,
    parse_severity_remap,
};
pub use factory::ValidatorFactory;
pub use loader::{CallbackRegistry, ClassLoader, LoaderFn, LoaderId, LoaderRuntime};
pub use parser::{DefinitionKind, PhpDefinition, PhpFileParser};
pub use report::{Destination, Report, Severity, TracingDestination};
pub use scanner::{ClassScanner, ExcludePattern, ScanResult, Scanner};
pub use validator::{
    ClassMapValidator, FilesValidator, Psr0Validator, Psr4Validator, Validator, ValidatorBase,
};
pub use violation::{ParamValue, Violation, ViolationKind};
