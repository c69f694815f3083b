//! Machine-readable output.
//!
//! A run prints exactly one JSON document on stdout: the serialized report
//! plus any scanner ambiguities, or an error object when validation could
//! not run.

use autolint_core::to_json_pretty;
use autolint_validator::Report;
use serde::Serialize;

/// JSON-serializable error structure.
#[derive(Debug, Serialize)]
pub struct JsonError {
    /// Error code (e.g., "E0101"), absent for errors outside autolint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Error code title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    /// Detailed error message
    pub message: String,
    /// Suggestions for fixing the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl JsonError {
    /// Build from any error, keeping code and suggestions of autolint errors.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<autolint_core::Error>() {
            Some(core) => Self {
                code: Some(core.code().as_str()),
                title: Some(core.code().title()),
                message: core.to_string(),
                suggestions: core.suggestions().to_vec(),
            },
            None => Self {
                code: None,
                title: None,
                message: format!("{err:#}"),
                suggestions: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorDocument {
    failed: bool,
    error: JsonError,
}

/// A class declared in more than one scanned file.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Ambiguity<'a> {
    /// Validator whose scan found it
    pub validator: &'a str,
    /// Scanner message naming the class and both files
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ambiguities: Vec<Ambiguity<'a>>,
}

fn report_document<'a>(
    report: &'a Report,
    ambiguities: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> anyhow::Result<String> {
    let document = ReportDocument {
        report,
        ambiguities: ambiguities
            .into_iter()
            .map(|(validator, message)| Ambiguity { validator, message })
            .collect(),
    };
    Ok(to_json_pretty(&document)?)
}

/// Print the report with the scanner ambiguities of the run.
pub fn print_report<'a>(
    report: &'a Report,
    ambiguities: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> anyhow::Result<()> {
    println!("{}", report_document(report, ambiguities)?);
    Ok(())
}

/// Print an error document.
pub fn print_error(err: &anyhow::Error) {
    let document = ErrorDocument {
        failed: true,
        error: JsonError::from_anyhow(err),
    };
    match to_json_pretty(&document) {
        Ok(json) => println!("{json}"),
        Err(_) => eprintln!("Error: {err:#}"),
    }
}
