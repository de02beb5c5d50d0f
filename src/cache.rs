//! Compiled template cache.
//!
//! Units are keyed by resolved path. Inline sources rendered with
//! `render_str` are keyed by a hash of their text and checked against the
//! stored source on every hit; at most [`MAX_INLINE_UNITS`] of them are
//! kept, oldest evicted first. Compilation runs outside the lock; when two
//! threads race on the same key the first insert wins.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHasher};
use tracing::debug;

use crate::compiler::CompiledUnit;
use crate::error::Result;

/// Inline units kept before the oldest is evicted.
pub const MAX_INLINE_UNITS: usize = 256;

/// Shared map from key to compiled unit.
#[derive(Debug, Default)]
pub struct TemplateCache {
    units: RwLock<FxHashMap<String, Arc<CompiledUnit>>>,
    inline: RwLock<IndexMap<u64, Arc<CompiledUnit>, FxBuildHasher>>,
    development: bool,
}

impl TemplateCache {
    /// With `development` set every lookup recompiles.
    pub fn new(development: bool) -> Self {
        Self {
            units: RwLock::default(),
            inline: RwLock::default(),
            development,
        }
    }

    /// Returns the unit cached for `path`, compiling it on a miss.
    pub fn get_or_compile<F>(&self, path: &str, compile: F) -> Result<Arc<CompiledUnit>>
    where
        F: FnOnce() -> Result<CompiledUnit>,
    {
        if !self.development {
            let units = self.units.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(unit) = units.get(path) {
                debug!(path = %path, "template cache hit");
                return Ok(Arc::clone(unit));
            }
        }

        debug!(path = %path, development = self.development, "compiling template");
        let compiled = Arc::new(compile()?);

        let mut units = self.units.write().unwrap_or_else(PoisonError::into_inner);
        match units.get(path) {
            Some(existing) if !self.development => Ok(Arc::clone(existing)),
            _ => {
                units.insert(path.to_string(), Arc::clone(&compiled));
                Ok(compiled)
            }
        }
    }

    /// Returns the unit for an inline `source` compiled under `path`.
    pub fn get_or_compile_inline<F>(
        &self,
        source: &str,
        path: &str,
        compile: F,
    ) -> Result<Arc<CompiledUnit>>
    where
        F: FnOnce() -> Result<CompiledUnit>,
    {
        let key = inline_key(source, path);
        let matches = |unit: &CompiledUnit| unit.source() == source && unit.path() == path;

        if !self.development {
            let inline = self.inline.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(unit) = inline.get(&key).filter(|unit| matches(unit)) {
                debug!(key, "inline template cache hit");
                return Ok(Arc::clone(unit));
            }
        }

        debug!(key, "compiling inline template");
        let compiled = Arc::new(compile()?);
        if self.development {
            return Ok(compiled);
        }

        let mut inline = self.inline.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inline.get(&key).filter(|unit| matches(unit)) {
            return Ok(Arc::clone(existing));
        }
        if inline.len() >= MAX_INLINE_UNITS && !inline.contains_key(&key) {
            inline.shift_remove_index(0);
        }
        inline.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drops the unit cached for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &str) -> bool {
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    pub fn clear(&self) {
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.inline
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Cached units, path-keyed and inline together.
    pub fn len(&self) -> usize {
        self.units.read().unwrap_or_else(PoisonError::into_inner).len()
            + self.inline.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_development(&self) -> bool {
        self.development
    }
}

fn inline_key(source: &str, path: &str) -> u64 {
    let mut hasher = FxHasher::default();
    path.hash(&mut hasher);
    source.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::compiler::compile;

    fn compiler<'a>(source: &'a str, calls: &'a Cell<usize>) -> impl FnOnce() -> Result<CompiledUnit> + 'a {
        move || {
            calls.set(calls.get() + 1);
            Ok(compile(source, "/t")?)
        }
    }

    #[test]
    fn test_compiles_once() {
        let cache = TemplateCache::new(false);
        let calls = Cell::new(0);
        let a = cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        let b = cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_development_recompiles() {
        let cache = TemplateCache::new(true);
        let calls = Cell::new(0);
        cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TemplateCache::new(false);
        let calls = Cell::new(0);
        cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        assert!(cache.invalidate("/t"));
        assert!(!cache.invalidate("/t"));
        cache.get_or_compile("/t", compiler("x", &calls)).unwrap();
        assert_eq!(calls.get(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inline_sources_keyed_by_text() {
        let cache = TemplateCache::new(false);
        let calls = Cell::new(0);
        let a = cache
            .get_or_compile_inline("a", "/t", compiler("a", &calls))
            .unwrap();
        let b = cache
            .get_or_compile_inline("b", "/t", compiler("b", &calls))
            .unwrap();
        let again = cache
            .get_or_compile_inline("a", "/t", compiler("a", &calls))
            .unwrap();
        assert_eq!(calls.get(), 2);
        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_inline_sources_are_bounded() {
        let cache = TemplateCache::new(false);
        let calls = Cell::new(0);
        let sources: Vec<String> = (0..MAX_INLINE_UNITS + 50).map(|i| format!("row {}", i)).collect();
        for source in &sources {
            cache
                .get_or_compile_inline(source, "/t", compiler(source, &calls))
                .unwrap();
        }
        assert_eq!(cache.len(), MAX_INLINE_UNITS);

        // newest entries survive, the oldest were evicted
        let last = sources.last().unwrap();
        cache.get_or_compile_inline(last, "/t", compiler(last, &calls)).unwrap();
        assert_eq!(calls.get(), sources.len());
        cache.get_or_compile_inline(&sources[0], "/t", compiler(&sources[0], &calls)).unwrap();
        assert_eq!(calls.get(), sources.len() + 1);
        assert_eq!(cache.len(), MAX_INLINE_UNITS);
    }

    #[test]
    fn test_development_does_not_keep_inline_units() {
        let cache = TemplateCache::new(true);
        let calls = Cell::new(0);
        cache.get_or_compile_inline("a", "/t", compiler("a", &calls)).unwrap();
        cache.get_or_compile_inline("a", "/t", compiler("a", &calls)).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_compile_errors_are_not_cached() {
        let cache = TemplateCache::new(false);
        let calls = Cell::new(0);
        assert!(cache.get_or_compile("/t", compiler("{{end}}", &calls)).is_err());
        assert!(cache.is_empty());
    }
}
