//! Testing utilities for autolint.
//!
//! # Modules
//!
//! - [`fixtures`]: manifests and PHP sources for common layouts
//! - [`temp_project`]: temporary package trees on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use autolint_test_utils::fixtures::Fixtures;
//! use autolint_test_utils::temp_project::TempProject;
//!
//! let project = TempProject::new()
//!     .with_composer_json(Fixtures::psr4_composer_json("Acme\\", "src/"))
//!     .with_php_class("src/Foo.php", "Acme", "Foo")
//!     .build()
//!     .unwrap();
//! assert!(project.file_exists("src/Foo.php"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod fixtures;
pub mod temp_project;

/// Re-export commonly used testing utilities.
pub mod prelude {
    pub use crate::fixtures::Fixtures;
    pub use crate::temp_project::TempProject;
}
