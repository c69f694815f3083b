//! Violation model.
//!
//! A violation is an immutable finding produced by a validator (or by the
//! aggregate class map). It carries the originating validator name and the
//! kind-specific parameters, and renders a message by substituting
//! `{param}` placeholders from those parameters.

use crate::config::LoaderType;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::fmt;

/// What went wrong, with the data needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A declared path produced no classes.
    NoClassesFoundInPath {
        /// Loader that declared the path; decides the prefix parameter name.
        loader: LoaderType,
        /// Declared prefix, or the declared entry for classmap loaders.
        prefix: String,
        /// Resolved path that was scanned.
        path: String,
    },
    /// A class lives somewhere other than where its rule says it should.
    ClassFoundInWrongFile {
        /// Declared prefix.
        prefix: String,
        /// Resolved base path.
        path: String,
        /// Class name.
        class: String,
        /// File the class was found in.
        file_is: String,
        /// File the class should be in.
        file_should: String,
    },
    /// A class namespace does not belong under the declared prefix.
    NamespacePrefixMismatch {
        /// Declared prefix.
        prefix: String,
        /// Resolved base path.
        path: String,
        /// Class name.
        class: String,
        /// The namespace the class actually declares.
        namespace: String,
    },
    /// PSR-0 namespace prefix without trailing separator.
    NamespaceShouldEndWithBackslash {
        /// Declared prefix.
        prefix: String,
        /// Resolved base path.
        path: String,
    },
    /// PSR-4 namespace prefix without trailing separator.
    NamespaceMustEndWithBackslash {
        /// Declared prefix.
        prefix: String,
        /// Resolved base path.
        path: String,
    },
    /// Prefix declared as an unkeyed list entry.
    NameSpaceInvalid {
        /// Declared prefix (a list index).
        prefix: String,
        /// Resolved base path.
        path: String,
    },
    /// A `files` entry does not exist.
    FileNotFound {
        /// The entry as declared.
        file_entry: String,
    },
    /// A class is provided by more than one file.
    ClassAddedMoreThanOnce {
        /// Class name.
        class_name: String,
        /// Validator name → file, in discovery order.
        files: Vec<(String, String)>,
    },
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text, substituted into messages.
    Text(String),
    /// Composite value; left as a placeholder in messages.
    Map(Vec<(String, String)>),
}

impl ParamValue {
    /// Text content, if this is a text parameter.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Map(_) => None,
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    validator_name: String,
    kind: ViolationKind,
}

impl Violation {
    /// Create a violation raised by `validator_name`.
    #[must_use]
    pub fn new(validator_name: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            validator_name: validator_name.into(),
            kind,
        }
    }

    /// Name of the validator that produced this violation.
    #[must_use]
    pub fn validator_name(&self) -> &str {
        &self.validator_name
    }

    /// The finding.
    #[must_use]
    pub const fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    /// Stable identifier of the violation kind.
    #[must_use]
    pub const fn kind_id(&self) -> &'static str {
        match self.kind {
            ViolationKind::NoClassesFoundInPath { .. } => "NoClassesFoundInPath",
            ViolationKind::ClassFoundInWrongFile { .. } => "ClassFoundInWrongFile",
            ViolationKind::NamespacePrefixMismatch { .. } => "NamespacePrefixMismatch",
            ViolationKind::NamespaceShouldEndWithBackslash { .. } => {
                "NamespaceShouldEndWithBackslash"
            }
            ViolationKind::NamespaceMustEndWithBackslash { .. } => "NamespaceMustEndWithBackslash",
            ViolationKind::NameSpaceInvalid { .. } => "NameSpaceInvalid",
            ViolationKind::FileNotFound { .. } => "FileNotFound",
            ViolationKind::ClassAddedMoreThanOnce { .. } => "ClassAddedMoreThanOnce",
        }
    }

    /// Named parameters, `validatorName` first.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, ParamValue)> {
        let text = |s: &str| ParamValue::Text(s.to_string());
        let mut params = vec![("validatorName", text(&self.validator_name))];

        match &self.kind {
            ViolationKind::NoClassesFoundInPath {
                loader,
                prefix,
                path,
            } => {
                let key = if *loader == LoaderType::ClassMap {
                    "classMapPrefix"
                } else {
                    "prefix"
                };
                params.push((key, text(prefix)));
                params.push(("path", text(path)));
            }
            ViolationKind::ClassFoundInWrongFile {
                prefix,
                path,
                class,
                file_is,
                file_should,
            } => {
                params.push(("prefix", text(prefix)));
                params.push(("path", text(path)));
                params.push(("class", text(class)));
                params.push(("fileIs", text(file_is)));
                params.push(("fileShould", text(file_should)));
            }
            ViolationKind::NamespacePrefixMismatch {
                prefix,
                path,
                class,
                namespace,
            } => {
                params.push(("prefix", text(prefix)));
                params.push(("path", text(path)));
                params.push(("class", text(class)));
                params.push(("namespace", text(namespace)));
            }
            ViolationKind::NamespaceShouldEndWithBackslash { prefix, path }
            | ViolationKind::NamespaceMustEndWithBackslash { prefix, path }
            | ViolationKind::NameSpaceInvalid { prefix, path } => {
                params.push(("prefix", text(prefix)));
                params.push(("path", text(path)));
            }
            ViolationKind::FileNotFound { file_entry } => {
                params.push(("fileEntry", text(file_entry)));
            }
            ViolationKind::ClassAddedMoreThanOnce { class_name, files } => {
                params.push(("className", text(class_name)));
                params.push(("files", ParamValue::Map(files.clone())));
            }
        }

        params
    }

    /// Message template with `{param}` placeholders.
    #[must_use]
    pub const fn template(&self) -> &'static str {
        match self.kind {
            ViolationKind::NoClassesFoundInPath {
                loader: LoaderType::ClassMap,
                ..
            } => {
                "[{validatorName}] No classes found in classmap entry \"{classMapPrefix}\" ({path})."
            }
            ViolationKind::NoClassesFoundInPath { .. } => {
                "[{validatorName}] No classes found for prefix \"{prefix}\" in {path}."
            }
            ViolationKind::ClassFoundInWrongFile { .. } => {
                "[{validatorName}] Class {class} found in {fileIs}, expected {fileShould} (prefix \"{prefix}\" in {path})."
            }
            ViolationKind::NamespacePrefixMismatch { .. } => {
                "[{validatorName}] Class {class} has namespace \"{namespace}\" which does not match prefix \"{prefix}\" for {path}."
            }
            ViolationKind::NamespaceShouldEndWithBackslash { .. } => {
                "[{validatorName}] Namespace prefix \"{prefix}\" for {path} should end with a namespace separator."
            }
            ViolationKind::NamespaceMustEndWithBackslash { .. } => {
                "[{validatorName}] Namespace prefix \"{prefix}\" for {path} must end with a namespace separator."
            }
            ViolationKind::NameSpaceInvalid { .. } => {
                "[{validatorName}] Prefix \"{prefix}\" for {path} is not a namespace; declare the entries as a prefix map."
            }
            ViolationKind::FileNotFound { .. } => {
                "[{validatorName}] File \"{fileEntry}\" does not exist."
            }
            ViolationKind::ClassAddedMoreThanOnce { .. } => {
                "[{validatorName}] Class {className} is provided more than once: {files}"
            }
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        interpolate(self.template(), &self.params())
    }
}

/// Substitute `{name}` placeholders with text parameters.
///
/// Unknown names and composite values are left as written.
fn interpolate(template: &str, params: &[(&str, ParamValue)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match params
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_text())
        {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

struct Params<'a>(&'a [(&'static str, ParamValue)]);

impl Serialize for Params<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let params = self.params();
        let mut state = serializer.serialize_struct("Violation", 4)?;
        state.serialize_field("kind", self.kind_id())?;
        state.serialize_field("validator", &self.validator_name)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("params", &Params(&params))?;
        state.end()
    }
}
