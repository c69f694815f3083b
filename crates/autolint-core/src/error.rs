//! Error types for autolint operations.
//!
//! Each error has:
//! - A unique error code (e.g., E0101) for easy reference and searching
//! - A clear error message explaining what went wrong
//! - Suggestions for how to fix the issue
//!
//! Errors are reserved for conditions that stop a run: broken configuration,
//! unreadable sources and failing report destinations. Autoload findings are
//! violations, not errors.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for autolint errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration errors (E01xx)
    /// Unknown autoload loader type
    E0101,
    /// Malformed declared autoload content
    E0102,
    /// Invalid exclusion pattern
    E0103,
    /// Unknown severity name
    E0104,

    // Manifest errors (E02xx)
    /// Invalid composer.json
    E0201,
    /// Invalid JSON syntax
    E0202,

    // Class map errors (E03xx)
    /// Class already registered for another file
    E0301,
    /// Class not registered
    E0302,

    // IO errors (E04xx)
    /// File not found
    E0401,
    /// Permission denied
    E0402,
    /// Source file cannot be scanned
    E0403,

    // Report errors (E05xx)
    /// Report destination failed
    E0501,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0501 => "E0501",
        }
    }

    /// Get a brief title for this error code.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::E0101 => "Unknown loader type",
            Self::E0102 => "Invalid autoload content",
            Self::E0103 => "Invalid exclusion pattern",
            Self::E0104 => "Unknown severity",
            Self::E0201 => "Invalid manifest",
            Self::E0202 => "JSON syntax error",
            Self::E0301 => "Class already registered",
            Self::E0302 => "Class not registered",
            Self::E0401 => "File not found",
            Self::E0402 => "Permission denied",
            Self::E0403 => "Unscannable source",
            Self::E0501 => "Report delivery failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A report destination that refused a violation.
#[derive(Debug)]
pub struct DeliveryFailure {
    /// Destination name.
    pub destination: String,
    /// What the destination returned.
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.destination, self.source)
    }
}

/// Main error type for autolint.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown loader type in an autoload section.
    #[error("[{code}] unknown autoload type '{loader_type}' in section '{section}'")]
    UnknownLoaderType {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Section name (`autoload` or `autoload-dev`).
        section: String,
        /// Offending loader type.
        loader_type: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Configuration error.
    #[error("[{code}] config error: {message}")]
    Config {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Configuration key.
        key: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Invalid manifest.
    #[error("[{code}] invalid manifest: {message}")]
    InvalidManifest {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// File path.
        path: Option<PathBuf>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// JSON error.
    #[error("[E0202] json error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// IO error.
    #[error("[{code}] io error at {path}: {message}")]
    Io {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// A source file could not be scanned for classes.
    #[error("[E0403] cannot scan {path}: {message}")]
    Scan {
        /// File path.
        path: PathBuf,
        /// Reason.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Class already registered for a different file.
    #[error(
        "[E0301] class '{class}' is already registered for {existing}, cannot register {attempted}"
    )]
    ClassAlreadyRegistered {
        /// Class name.
        class: String,
        /// File the class is registered for.
        existing: PathBuf,
        /// File that was rejected.
        attempted: PathBuf,
    },

    /// Class not registered.
    #[error("[E0302] class '{class}' is not registered")]
    ClassNotRegistered {
        /// Class name.
        class: String,
    },

    /// One or more report destinations failed.
    #[error("[E0501] {} report destination(s) failed", .failures.len())]
    Delivery {
        /// Every failure collected for a single append.
        failures: Vec<DeliveryFailure>,
    },
}

/// Wrapper to make `ErrorCode` usable as a source.
#[derive(Debug)]
pub struct ErrorCodeSource(pub ErrorCode);

impl fmt::Display for ErrorCodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl std::error::Error for ErrorCodeSource {}

impl Error {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownLoaderType { code, .. } => code.0,
            Self::Config { code, .. } => code.0,
            Self::InvalidManifest { code, .. } => code.0,
            Self::Json(_) => ErrorCode::E0202,
            Self::Io { code, .. } => code.0,
            Self::Scan { .. } => ErrorCode::E0403,
            Self::ClassAlreadyRegistered { .. } => ErrorCode::E0301,
            Self::ClassNotRegistered { .. } => ErrorCode::E0302,
            Self::Delivery { .. } => ErrorCode::E0501,
        }
    }

    /// Get suggestions for fixing this error.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::UnknownLoaderType { suggestions, .. }
            | Self::Config { suggestions, .. }
            | Self::InvalidManifest { suggestions, .. }
            | Self::Io { suggestions, .. }
            | Self::Scan { suggestions, .. } => suggestions,
            Self::Json(_)
            | Self::ClassAlreadyRegistered { .. }
            | Self::ClassNotRegistered { .. }
            | Self::Delivery { .. } => &[],
        }
    }

    /// Create an IO error with context.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let (code, suggestions) = match err.kind() {
            std::io::ErrorKind::NotFound => (
                ErrorCode::E0401,
                vec![
                    format!("Check if the path exists: {}", path.display()),
                    "Check the paths declared in the autoload section of composer.json"
                        .to_string(),
                ],
            ),
            std::io::ErrorKind::PermissionDenied => (
                ErrorCode::E0402,
                vec![
                    format!("Check permissions on: {}", path.display()),
                    "On Unix, check file ownership with 'ls -la'".to_string(),
                ],
            ),
            _ => (
                ErrorCode::E0401,
                vec![format!("Check the file: {}", path.display())],
            ),
        };
        Self::Io {
            code: ErrorCodeSource(code),
            path,
            message: err.to_string(),
            suggestions,
        }
    }

    /// Create an unknown loader type error.
    #[must_use]
    pub fn unknown_loader_type(section: impl Into<String>, loader_type: impl Into<String>) -> Self {
        let section = section.into();
        let loader_type = loader_type.into();
        Self::UnknownLoaderType {
            code: ErrorCodeSource(ErrorCode::E0101),
            suggestions: vec![
                "Supported types are: psr-0, psr-4, classmap, files".to_string(),
                format!("Check the '{section}' section of composer.json for typos"),
            ],
            section,
            loader_type,
        }
    }

    /// Create a configuration error for a specific key.
    #[must_use]
    pub fn config_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        Self::Config {
            code: ErrorCodeSource(ErrorCode::E0102),
            message: message.into(),
            suggestions: vec![format!("Check the value of '{key}' in composer.json")],
            key: Some(key),
        }
    }

    /// Create an invalid exclusion pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
        let pattern = pattern.into();
        Self::Config {
            code: ErrorCodeSource(ErrorCode::E0103),
            message: format!("invalid exclusion pattern '{pattern}': {reason}"),
            key: Some(pattern),
            suggestions: vec![
                "Exclusion patterns are regular expressions matched against absolute paths"
                    .to_string(),
            ],
        }
    }

    /// Create an unknown severity error.
    #[must_use]
    pub fn unknown_severity(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Config {
            code: ErrorCodeSource(ErrorCode::E0104),
            message: format!("unknown severity '{name}'"),
            key: Some(name),
            suggestions: vec![
                "Use one of: debug, info, notice, warning, error, critical, alert, emergency"
                    .to_string(),
            ],
        }
    }

    /// Create an invalid manifest error.
    #[must_use]
    pub fn invalid_manifest(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        let mut suggestions = vec!["Check JSON syntax with a JSON validator".to_string()];
        if let Some(ref p) = path {
            suggestions.push(format!("Edit the file: {}", p.display()));
        }
        Self::InvalidManifest {
            code: ErrorCodeSource(ErrorCode::E0201),
            message: message.into(),
            path,
            suggestions,
        }
    }

    /// Create a scan error.
    #[must_use]
    pub fn scan(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self::Scan {
            suggestions: vec![
                format!("Check the file: {}", path.display()),
                "Exclude it with --exclude if it is not PHP source".to_string(),
            ],
            path,
            message: message.into(),
        }
    }

    /// Create a class already registered error.
    #[must_use]
    pub fn class_already_registered(
        class: impl Into<String>,
        existing: impl Into<PathBuf>,
        attempted: impl Into<PathBuf>,
    ) -> Self {
        Self::ClassAlreadyRegistered {
            class: class.into(),
            existing: existing.into(),
            attempted: attempted.into(),
        }
    }

    /// Create a class not registered error.
    #[must_use]
    pub fn class_not_registered(class: impl Into<String>) -> Self {
        Self::ClassNotRegistered {
            class: class.into(),
        }
    }

    /// Format the error with suggestions for display.
    #[must_use]
    pub fn display_with_suggestions(&self) -> String {
        let mut output = format!("{self}");
        if let Self::Delivery { failures } = self {
            for failure in failures {
                output.push_str(&format!("\n  - {failure}"));
            }
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\n\nSuggestions:");
            for suggestion in suggestions {
                output.push_str(&format!("\n  • {suggestion}"));
            }
        }
        output
    }
}

/// Result type for autolint operations.
pub type Result<T> = std::result::Result<T, Error>;
