//! Temporary package trees for integration tests.
//!
//! A project is a temporary directory with a `composer.json` and whatever
//! sources the test declares. It is removed when dropped.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

use crate::fixtures::Fixtures;

/// A temporary project directory for testing.
#[derive(Debug)]
pub struct TempProject {
    dir: TempDir,
    composer_json_path: PathBuf,
}

impl TempProject {
    /// Create a new temporary project builder.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new() -> TempProjectBuilder {
        TempProjectBuilder::default()
    }

    /// Get the root directory of the project.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the path to composer.json.
    #[must_use]
    pub fn composer_json_path(&self) -> &Path {
        &self.composer_json_path
    }

    /// Overwrite composer.json.
    pub fn write_composer_json(&self, content: &Value) -> Result<()> {
        let json = serde_json::to_string_pretty(content)?;
        fs::write(&self.composer_json_path, json).context("Failed to write composer.json")
    }

    /// Create a file in the project directory.
    pub fn create_file(&self, relative_path: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        write_file(self.dir.path(), relative_path, content.as_ref())
    }

    /// Create a directory in the project.
    pub fn create_dir(&self, relative_path: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative_path);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {relative_path}"))?;
        Ok(path)
    }

    /// Check if a file exists in the project.
    #[must_use]
    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.dir.path().join(relative_path).exists()
    }

    /// `/`-separated absolute path of a project file.
    #[must_use]
    pub fn display_path(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.dir.path().to_string_lossy().replace('\\', "/"),
            relative_path
        )
    }
}

fn write_file(root: &Path, relative_path: &str, content: &[u8]) -> Result<PathBuf> {
    let path = root.join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent of {relative_path}"))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {relative_path}"))?;
    Ok(path)
}

/// Builder for creating temporary projects.
#[derive(Debug, Default)]
pub struct TempProjectBuilder {
    composer_json: Option<Value>,
    raw_composer_json: Option<String>,
    dirs: Vec<String>,
    files: Vec<(String, String)>,
}

impl TempProjectBuilder {
    /// Set the composer.json content.
    #[must_use]
    pub fn with_composer_json(mut self, content: Value) -> Self {
        self.composer_json = Some(content);
        self
    }

    /// Set composer.json verbatim (for malformed manifests).
    #[must_use]
    pub fn with_raw_composer_json(mut self, content: impl Into<String>) -> Self {
        self.raw_composer_json = Some(content.into());
        self
    }

    /// Create an empty directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<String>) -> Self {
        self.dirs.push(path.into());
        self
    }

    /// Add a file to be created.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Add a class declared in `namespace` at `path`.
    #[must_use]
    pub fn with_php_class(
        self,
        path: impl Into<String>,
        namespace: &str,
        class_name: &str,
    ) -> Self {
        self.with_file(path, Fixtures::php_class_content(namespace, class_name))
    }

    /// Build the temporary project.
    pub fn build(self) -> Result<TempProject> {
        let dir = tempdir().context("Failed to create temp directory")?;
        let root = dir.path();

        let composer_json_path = root.join("composer.json");
        let json_content = match self.raw_composer_json {
            Some(raw) => raw,
            None => serde_json::to_string_pretty(
                &self
                    .composer_json
                    .unwrap_or_else(Fixtures::empty_composer_json),
            )?,
        };
        fs::write(&composer_json_path, json_content).context("Failed to write composer.json")?;

        for path in self.dirs {
            fs::create_dir_all(root.join(&path))
                .with_context(|| format!("Failed to create directory: {path}"))?;
        }

        for (path, content) in self.files {
            write_file(root, &path, content.as_bytes())?;
        }

        Ok(TempProject {
            dir,
            composer_json_path,
        })
    }
}
