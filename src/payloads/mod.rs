//! Payloads - Named payload sets and payload resolution
//!
//! A [`PayloadStore`] is built once at start-up and handed to the
//! injection engine. A [`PayloadSpec`] selects payloads from it (or
//! supplies them directly), and resolution materializes them into a
//! replayable [`Payloads`] sequence.

pub mod builtin;
pub mod encoding;

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

pub use self::encoding::{PayloadEncoding, PreFunc};
use crate::config::{Config, ConfigLoadError};
use crate::errors::{InjectError, Result};

/// Name of the synthetic set aggregating the default categories
pub const DEFAULT_SET: &str = "default";

/// Categories concatenated into the `default` set, in order
pub const DEFAULT_CATEGORIES: &[&str] = &["sqli", "xss", "cmd", "dir", "misc"];

/// Selects the payloads of an injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSpec {
    /// A set from the payload store
    Named(String),
    /// Payloads given directly, used in order
    Explicit(Vec<String>),
}

impl PayloadSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Build an explicit sequence from any values with a string form
    pub fn explicit<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::Explicit(values.into_iter().map(|v| v.to_string()).collect())
    }
}

impl Default for PayloadSpec {
    fn default() -> Self {
        Self::Named(DEFAULT_SET.to_string())
    }
}

impl From<&str> for PayloadSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Vec<String>> for PayloadSpec {
    fn from(values: Vec<String>) -> Self {
        Self::Explicit(values)
    }
}

/// Resolved payloads, shared between every consumer
///
/// Cloning is cheap and every clone iterates the full sequence in the
/// same order, so one resolution can be replayed across many requests
/// and locators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payloads(Arc<[String]>);

impl Payloads {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Payloads {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Payloads {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Named payload sets, loaded once
#[derive(Debug, Clone)]
pub struct PayloadStore {
    sets: IndexMap<String, Vec<String>>,
    default_categories: Vec<String>,
}

impl Default for PayloadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadStore {
    /// Create a store holding only the (empty) default set
    pub fn new() -> Self {
        Self {
            sets: IndexMap::new(),
            default_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Create a store with the built-in category sets
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for (name, payloads) in builtin::sets() {
            store.insert(name, payloads.iter().map(|p| p.to_string()).collect());
        }
        store
    }

    /// Build the store described by a configuration
    ///
    /// Built-in sets come first, then the payload directory, then inline
    /// sets; later sources replace earlier sets of the same name.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigLoadError> {
        let mut store = Self::builtin();
        if let Some(categories) = &config.payloads.default_categories {
            store.default_categories = categories.clone();
        }
        if let Some(dir) = &config.payloads.dir {
            store.load_dir(dir)?;
        }
        for (name, payloads) in &config.payloads.sets {
            store.insert(name.clone(), payloads.clone());
        }
        Ok(store)
    }

    /// Replace the categories aggregated into the default set
    pub fn with_default_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Add or replace a named set
    pub fn insert(&mut self, name: impl Into<String>, payloads: Vec<String>) {
        self.sets.insert(name.into(), payloads);
    }

    /// Load one set per file from a directory, one payload per line
    ///
    /// Files are read in name order; hidden files are skipped. Returns the
    /// number of sets loaded.
    pub fn load_dir(&mut self, dir: &Path) -> std::result::Result<usize, ConfigLoadError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ConfigLoadError::ReadError(format!("{}: {}", dir.display(), e))
        })?;

        let mut files: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut loaded = 0;
        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ConfigLoadError::ReadError(format!("{}: {}", path.display(), e))
            })?;
            let payloads: Vec<String> = content.lines().map(str::to_string).collect();
            debug!("Loaded payload set '{}' ({} payloads)", name, payloads.len());
            self.insert(name.to_string(), payloads);
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Look up a set by name; `default` is synthesized from the categories
    pub fn get(&self, name: &str) -> Option<Vec<String>> {
        if name == DEFAULT_SET {
            let mut payloads = self.sets.get(DEFAULT_SET).cloned().unwrap_or_default();
            for category in &self.default_categories {
                if let Some(set) = self.sets.get(category) {
                    payloads.extend(set.iter().cloned());
                }
            }
            return Some(payloads);
        }
        self.sets.get(name).cloned()
    }

    /// All set names, `default` first
    pub fn names(&self) -> Vec<String> {
        std::iter::once(DEFAULT_SET.to_string())
            .chain(
                self.sets
                    .keys()
                    .filter(|name| name.as_str() != DEFAULT_SET)
                    .cloned(),
            )
            .collect()
    }

    /// Number of sets, `default` included
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Whether no payload at all is available
    pub fn is_empty(&self) -> bool {
        self.sets.values().all(|set| set.is_empty())
    }

    /// Resolve a specifier to its payload strings, in order
    pub fn resolve(&self, spec: &PayloadSpec) -> Result<Vec<String>> {
        match spec {
            PayloadSpec::Named(name) => self
                .get(name)
                .ok_or_else(|| InjectError::payload_not_found(name, &self.names())),
            PayloadSpec::Explicit(values) => Ok(values.clone()),
        }
    }

    /// Resolve and pre-process payloads into a replayable sequence
    pub fn prepare(&self, spec: &PayloadSpec, pre_func: &PreFunc) -> Result<Payloads> {
        let payloads: Payloads = self
            .resolve(spec)?
            .iter()
            .map(|payload| pre_func(payload.as_str()))
            .collect();
        debug!("Resolved {} payloads", payloads.len());
        Ok(payloads)
    }
}
