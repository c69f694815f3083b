//! Severity-tagged violation collection.
//!
//! A [`Report`] stores every violation under its final severity and forwards
//! it to each configured [`Destination`]. Severities can be remapped per
//! report, either escalated (`warning` → `error`) or silenced.

use crate::violation::Violation;
use autolint_core::{AHashMap, DeliveryFailure, Error, Result};
use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Log severity levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Notice.
    Notice,
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Critical.
    Critical,
    /// Alert.
    Alert,
    /// Emergency.
    Emergency,
}

impl Severity {
    /// All levels, lowest first.
    pub const ALL: [Self; 8] = [
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Alert,
        Self::Emergency,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Alert => "alert",
            Self::Emergency => "emergency",
        }
    }

    /// Whether this level fails a run.
    #[must_use]
    pub fn is_failure(self) -> bool {
        self >= Self::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| name.eq_ignore_ascii_case(level.as_str()))
            .ok_or_else(|| Error::unknown_severity(s))
    }
}

/// Receives violations as they are appended to a report.
pub trait Destination: fmt::Debug {
    /// Name used when reporting delivery failures.
    fn name(&self) -> &str;

    /// Accept a violation at its final severity.
    fn append(
        &mut self,
        violation: &Violation,
        severity: Severity,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Forwards violations to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDestination;

impl Destination for TracingDestination {
    fn name(&self) -> &str {
        "tracing"
    }

    fn append(
        &mut self,
        violation: &Violation,
        severity: Severity,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let kind = violation.kind_id();
        let validator = violation.validator_name();
        let message = violation.message();
        match severity {
            Severity::Debug => tracing::debug!(kind, validator, "{message}"),
            Severity::Info | Severity::Notice => tracing::info!(kind, validator, "{message}"),
            Severity::Warning => tracing::warn!(kind, validator, "{message}"),
            _ => tracing::error!(kind, validator, %severity, "{message}"),
        }
        Ok(())
    }
}

/// Collected violations plus delivery configuration.
#[derive(Debug, Default)]
pub struct Report {
    destinations: Vec<Box<dyn Destination>>,
    severity_map: AHashMap<Severity, Option<Severity>>,
    violations: BTreeMap<Severity, Vec<Violation>>,
}

impl Report {
    /// Create a report delivering to `destinations`.
    #[must_use]
    pub fn new(destinations: Vec<Box<dyn Destination>>) -> Self {
        Self {
            destinations,
            ..Self::default()
        }
    }

    /// Set the severity remap table. `None` silences a level.
    #[must_use]
    pub fn with_severity_map(
        mut self,
        map: impl IntoIterator<Item = (Severity, Option<Severity>)>,
    ) -> Self {
        self.severity_map = map.into_iter().collect();
        self
    }

    /// Record `violation` at `severity` (after remapping) and deliver it.
    ///
    /// Every destination receives the violation even if an earlier one fails.
    ///
    /// # Errors
    /// Returns [`Error::Delivery`] listing each destination that failed.
    pub fn append(&mut self, violation: Violation, severity: Severity) -> Result<()> {
        let severity = match self.severity_map.get(&severity) {
            Some(Some(mapped)) => *mapped,
            Some(None) => return Ok(()),
            None => severity,
        };

        let mut failures = Vec::new();
        for destination in &mut self.destinations {
            if let Err(source) = destination.append(&violation, severity) {
                failures.push(DeliveryFailure {
                    destination: destination.name().to_string(),
                    source,
                });
            }
        }

        self.violations.entry(severity).or_default().push(violation);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Delivery { failures })
        }
    }

    /// Append at [`Severity::Error`].
    pub fn error(&mut self, violation: Violation) -> Result<()> {
        self.append(violation, Severity::Error)
    }

    /// Append at [`Severity::Warning`].
    pub fn warn(&mut self, violation: Violation) -> Result<()> {
        self.append(violation, Severity::Warning)
    }

    /// Whether anything is stored at `severity`.
    #[must_use]
    pub fn has(&self, severity: Severity) -> bool {
        self.violations.get(&severity).is_some_and(|v| !v.is_empty())
    }

    /// Violations stored at `severity`, in append order.
    #[must_use]
    pub fn get(&self, severity: Severity) -> &[Violation] {
        self.violations.get(&severity).map_or(&[], Vec::as_slice)
    }

    /// Violations stored at [`Severity::Error`].
    #[must_use]
    pub fn errors(&self) -> &[Violation] {
        self.get(Severity::Error)
    }

    /// Violations stored at [`Severity::Warning`].
    #[must_use]
    pub fn warnings(&self) -> &[Violation] {
        self.get(Severity::Warning)
    }

    /// Whether any errors were stored.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has(Severity::Error)
    }

    /// Whether any warnings were stored.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.has(Severity::Warning)
    }

    /// Whether anything at or above [`Severity::Error`] was stored.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        Severity::ALL
            .into_iter()
            .filter(|s| s.is_failure())
            .any(|s| self.has(s))
    }

    /// Total number of stored violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    /// Whether nothing was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored violations, most severe level first.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &Violation)> {
        self.violations
            .iter()
            .rev()
            .flat_map(|(severity, list)| list.iter().map(move |v| (*severity, v)))
    }
}

struct BySeverity<'a>(&'a BTreeMap<Severity, Vec<Violation>>);

impl Serialize for BySeverity<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (severity, list) in self.0.iter().rev() {
            map.serialize_entry(severity.as_str(), list)?;
        }
        map.end()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Report", 4)?;
        state.serialize_field("failed", &self.is_failure())?;
        state.serialize_field("errors", &self.errors().len())?;
        state.serialize_field("warnings", &self.warnings().len())?;
        state.serialize_field("violations", &BySeverity(&self.violations))?;
        state.end()
    }
}
