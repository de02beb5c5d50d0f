//! Per-render state shared by every template in an extends/include chain.

use rustc_hash::FxHashMap;

use crate::value::{Object, Value};

/// State threaded through one top-level render.
///
/// `globals` holds blocks and layout `content` hoisted for the whole chain.
/// `locals` is a stack of data frames, one per include or tag rerender;
/// inner frames shadow outer ones.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub(crate) globals: FxHashMap<String, Value>,
    pub(crate) locals: Vec<Object>,
    pub(crate) depth: usize,
}

impl RenderContext {
    /// A context whose only frame is `data`.
    pub fn new(data: Object) -> Self {
        Self::at_depth(data, 0)
    }

    pub(crate) fn at_depth(data: Object, depth: usize) -> Self {
        Self {
            globals: FxHashMap::default(),
            locals: vec![data],
            depth,
        }
    }

    /// Builds the name table a template activation starts with: globals
    /// first, then each local frame from outermost to innermost.
    pub fn flatten(&self) -> FxHashMap<String, Value> {
        let mut scope = self.globals.clone();
        for frame in &self.locals {
            scope.extend(frame.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        scope
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Current extends/include/tag nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(entries: &[(&str, &str)]) -> Object {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_inner_frames_win() {
        let mut ctx = RenderContext::new(frame(&[("a", "outer"), ("b", "outer")]));
        ctx.locals.push(frame(&[("a", "inner")]));
        let scope = ctx.flatten();
        assert_eq!(scope["a"], Value::from("inner"));
        assert_eq!(scope["b"], Value::from("outer"));
    }

    #[test]
    fn test_locals_shadow_globals() {
        let mut ctx = RenderContext::new(frame(&[("title", "local")]));
        ctx.set_global("title", Value::from("global"));
        ctx.set_global("nav", Value::from("menu"));
        let scope = ctx.flatten();
        assert_eq!(scope["title"], Value::from("local"));
        assert_eq!(scope["nav"], Value::from("menu"));
    }
}
