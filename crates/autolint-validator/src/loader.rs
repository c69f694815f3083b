//! Live class-loading model.
//!
//! Validators never load classes themselves. Registering a validator hands
//! its rules to a [`LoaderRuntime`], which owns a Composer-style
//! [`ClassLoader`] plus a stack of loader callbacks.

use crate::classmap::ClassMap;
use autolint_core::{AHashMap, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loader callback: class name → file, if it can provide the class.
pub type LoaderFn = Box<dyn Fn(&str) -> Option<PathBuf>>;

/// Handle of a registered loader callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderId(u64);

/// Composer-compatible lookup table.
#[derive(Debug, Clone, Default)]
pub struct ClassLoader {
    class_map: AHashMap<String, PathBuf>,
    psr4: Vec<(String, Vec<PathBuf>)>,
    psr4_fallback: Vec<PathBuf>,
    psr0: Vec<(String, Vec<PathBuf>)>,
    psr0_fallback: Vec<PathBuf>,
}

fn push_dirs(table: &mut Vec<(String, Vec<PathBuf>)>, prefix: &str, dirs: Vec<PathBuf>) {
    match table.iter_mut().find(|(p, _)| p == prefix) {
        Some((_, existing)) => existing.extend(dirs),
        None => table.push((prefix.to_string(), dirs)),
    }
}

fn first_existing(dirs: &[PathBuf], relative: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(relative))
        .find(|file| file.is_file())
}

impl ClassLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add explicit class → file entries. Existing entries win.
    pub fn add_class_map(&mut self, map: &ClassMap) {
        for (class, file) in map {
            self.class_map
                .entry(class.to_string())
                .or_insert_with(|| file.to_path_buf());
        }
    }

    /// Register PSR-4 directories for `prefix`; an empty prefix adds
    /// fallback directories.
    ///
    /// # Errors
    /// Returns a config error when a non-empty prefix lacks the trailing `\`.
    pub fn add_psr4(&mut self, prefix: &str, dirs: Vec<PathBuf>) -> Result<()> {
        if prefix.is_empty() {
            self.psr4_fallback.extend(dirs);
            return Ok(());
        }
        if !prefix.ends_with('\\') {
            return Err(Error::config_key(
                "psr-4",
                format!("a non-empty PSR-4 prefix must end with a namespace separator: '{prefix}'"),
            ));
        }
        push_dirs(&mut self.psr4, prefix, dirs);
        Ok(())
    }

    /// Register PSR-0 directories for `prefix`; an empty prefix adds
    /// fallback directories.
    pub fn add_psr0(&mut self, prefix: &str, dirs: Vec<PathBuf>) {
        if prefix.is_empty() {
            self.psr0_fallback.extend(dirs);
        } else {
            push_dirs(&mut self.psr0, prefix, dirs);
        }
    }

    /// Number of explicit class map entries.
    #[must_use]
    pub fn class_map_len(&self) -> usize {
        self.class_map.len()
    }

    /// Find the file that would define `class`.
    ///
    /// Lookup order: class map, PSR-4 by longest namespace prefix, PSR-4
    /// fallback, PSR-0, PSR-0 fallback.
    #[must_use]
    pub fn find_file(&self, class: &str) -> Option<PathBuf> {
        let class = class.strip_prefix('\\').unwrap_or(class);

        if let Some(file) = self.class_map.get(class) {
            return Some(file.clone());
        }

        let logical_psr4 = format!("{}.php", class.replace('\\', "/"));

        let mut sub_path = class;
        while let Some(last) = sub_path.rfind('\\') {
            sub_path = &class[..last];
            let search = &class[..=last];
            if let Some((_, dirs)) = self.psr4.iter().find(|(p, _)| p == search) {
                if let Some(file) = first_existing(dirs, &logical_psr4[last + 1..]) {
                    return Some(file);
                }
            }
        }

        if let Some(file) = first_existing(&self.psr4_fallback, &logical_psr4) {
            return Some(file);
        }

        // Underscores only act as separators in the class name segment.
        let logical_psr0 = match class.rfind('\\') {
            Some(pos) => format!(
                "{}{}.php",
                &logical_psr4[..=pos],
                class[pos + 1..].replace('_', "/")
            ),
            None => format!("{}.php", class.replace('_', "/")),
        };

        for (prefix, dirs) in &self.psr0 {
            if class.starts_with(prefix.as_str()) {
                if let Some(file) = first_existing(dirs, &logical_psr0) {
                    return Some(file);
                }
            }
        }

        first_existing(&self.psr0_fallback, &logical_psr0)
    }
}

/// A live class-loading environment validators can register into.
pub trait LoaderRuntime {
    /// The runtime's Composer-style loader.
    fn class_loader(&mut self) -> &mut ClassLoader;

    /// Append a loader callback.
    fn register(&mut self, loader: LoaderFn) -> LoaderId;

    /// Detach a callback, handing it back.
    fn unregister(&mut self, id: LoaderId) -> Option<LoaderFn>;

    /// Registered callbacks, in call order.
    fn registered(&self) -> Vec<LoaderId>;

    /// Include a file once. Including may register callbacks.
    fn include_file(&mut self, path: &Path) -> Result<()>;
}

/// In-memory [`LoaderRuntime`].
///
/// Files are never executed. Callbacks a file would register on inclusion
/// are declared up front with [`CallbackRegistry::on_include`].
#[derive(Default)]
pub struct CallbackRegistry {
    loader: ClassLoader,
    callbacks: Vec<(LoaderId, LoaderFn)>,
    pending: AHashMap<PathBuf, Vec<LoaderFn>>,
    included: Vec<PathBuf>,
    next_id: u64,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("loader", &self.loader)
            .field(
                "callbacks",
                &self.callbacks.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .field("included", &self.included)
            .finish_non_exhaustive()
    }
}

impl CallbackRegistry {
    /// Create an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a callback that including `path` registers.
    pub fn on_include(&mut self, path: impl Into<PathBuf>, loader: LoaderFn) {
        self.pending.entry(path.into()).or_default().push(loader);
    }

    /// Files included so far.
    #[must_use]
    pub fn included(&self) -> &[PathBuf] {
        &self.included
    }

    /// Read-only view of the class loader.
    #[must_use]
    pub const fn loader(&self) -> &ClassLoader {
        &self.loader
    }

    /// Resolve `class` through the class loader, then each callback in turn.
    #[must_use]
    pub fn resolve(&self, class: &str) -> Option<PathBuf> {
        self.loader
            .find_file(class)
            .or_else(|| self.callbacks.iter().find_map(|(_, cb)| cb(class)))
    }
}

impl LoaderRuntime for CallbackRegistry {
    fn class_loader(&mut self) -> &mut ClassLoader {
        &mut self.loader
    }

    fn register(&mut self, loader: LoaderFn) -> LoaderId {
        let id = LoaderId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, loader));
        id
    }

    fn unregister(&mut self, id: LoaderId) -> Option<LoaderFn> {
        let pos = self.callbacks.iter().position(|(i, _)| *i == id)?;
        Some(self.callbacks.remove(pos).1)
    }

    fn registered(&self) -> Vec<LoaderId> {
        self.callbacks.iter().map(|(id, _)| *id).collect()
    }

    fn include_file(&mut self, path: &Path) -> Result<()> {
        if self.included.iter().any(|p| p == path) {
            return Ok(());
        }
        std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
        self.included.push(path.to_path_buf());

        let registered = self.pending.remove(path).unwrap_or_default();
        debug!(path = %path.display(), callbacks = registered.len(), "included file");
        for loader in registered {
            self.register(loader);
        }
        Ok(())
    }
}
