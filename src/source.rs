//! Where template text comes from.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::value::Value;

/// Supplies template source by resolved path.
///
/// `handle` exposes per-template metadata (for example the asset handles a
/// bundler computed) to tag renderers.
pub trait TemplateSource: Send + Sync {
    fn source(&self, path: &str) -> Option<Cow<'_, str>>;

    fn handle(&self, _path: &str) -> Option<Value> {
        None
    }
}

impl<S: BuildHasher + Send + Sync> TemplateSource for HashMap<String, String, S> {
    fn source(&self, path: &str) -> Option<Cow<'_, str>> {
        self.get(path).map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl TemplateSource for BTreeMap<String, String> {
    fn source(&self, path: &str) -> Option<Cow<'_, str>> {
        self.get(path).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// In-memory templates with optional handles.
///
/// ```
/// use beard::{MemorySource, TemplateSource};
///
/// let source = MemorySource::new().with_template("/views/home", "hi {{name}}");
/// assert_eq!(source.source("/views/home").as_deref(), Some("hi {{name}}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
    handles: HashMap<String, Value>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn with_handle(mut self, path: impl Into<String>, handle: impl Into<Value>) -> Self {
        self.handles.insert(path.into(), handle.into());
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(path.into(), source.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for MemorySource {
    fn source(&self, path: &str) -> Option<Cow<'_, str>> {
        self.templates.get(path).map(|s| Cow::Borrowed(s.as_str()))
    }

    fn handle(&self, path: &str) -> Option<Value> {
        self.handles.get(path).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, text) in iter {
            source.insert(path, text);
        }
        source
    }
}
