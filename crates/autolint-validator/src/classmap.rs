//! Insertion-ordered class → file map.

use autolint_core::{AHashMap, Error, Result};
use std::path::{Path, PathBuf};

/// Mapping from fully qualified class name to the file declaring it.
///
/// Names are stored without a leading `\`, so `\Foo\Bar` and `Foo\Bar` are
/// the same entry. A class maps to exactly one file.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    entries: Vec<Option<(String, PathBuf)>>,
    index: AHashMap<String, usize>,
    len: usize,
}

fn normalize(class: &str) -> &str {
    class.strip_prefix('\\').unwrap_or(class)
}

impl ClassMap {
    /// Create an empty class map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` as declared in `file`.
    ///
    /// Adding the same pair twice is a no-op.
    ///
    /// # Errors
    /// Returns [`Error::ClassAlreadyRegistered`] if the class is already
    /// mapped to a different file.
    pub fn add(&mut self, class: &str, file: impl Into<PathBuf>) -> Result<()> {
        let class = normalize(class);
        let file = file.into();

        if let Some(&slot) = self.index.get(class) {
            if let Some((_, existing)) = &self.entries[slot] {
                if *existing != file {
                    return Err(Error::class_already_registered(class, existing, file));
                }
            }
            return Ok(());
        }

        self.index.insert(class.to_string(), self.entries.len());
        self.entries.push(Some((class.to_string(), file)));
        self.len += 1;
        Ok(())
    }

    /// Remove `class`, returning the file it was mapped to.
    pub fn remove(&mut self, class: &str) -> Result<PathBuf> {
        let class = normalize(class);
        let slot = self
            .index
            .remove(class)
            .ok_or_else(|| Error::class_not_registered(class))?;
        self.len -= 1;
        self.entries[slot]
            .take()
            .map(|(_, file)| file)
            .ok_or_else(|| Error::class_not_registered(class))
    }

    /// Whether `class` is registered.
    #[must_use]
    pub fn has(&self, class: &str) -> bool {
        self.index.contains_key(normalize(class))
    }

    /// File declaring `class`.
    pub fn file_for(&self, class: &str) -> Result<&Path> {
        let class = normalize(class);
        self.index
            .get(class)
            .and_then(|&slot| self.entries[slot].as_ref())
            .map(|(_, file)| file.as_path())
            .ok_or_else(|| Error::class_not_registered(class))
    }

    /// Whether the map holds no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Iterate `(class, file)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .flatten()
            .map(|(class, file)| (class.as_str(), file.as_path()))
    }

    /// Class names in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(class, _)| class)
    }
}

impl<'a> IntoIterator for &'a ClassMap {
    type Item = (&'a str, &'a Path);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Path)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
