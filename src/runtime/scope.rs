//! Name resolution for expressions.
//!
//! A template activation resolves names against one flat table. Function
//! literals capture that table when they are created and resolve their
//! parameters and local declarations first.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Something bare identifiers can be looked up in.
pub(crate) trait Scope {
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Snapshot for a closure created in this scope.
    fn capture(&self) -> Arc<Env>;
}

/// A captured scope chain.
#[derive(Debug, Default)]
pub struct Env {
    vars: FxHashMap<String, Value>,
    parent: Option<Arc<Env>>,
}

impl Env {
    fn lookup(&self, name: &str) -> Option<Value> {
        let mut env = self;
        loop {
            if let Some(value) = env.vars.get(name) {
                return Some(value.clone());
            }
            env = env.parent.as_deref()?;
        }
    }
}

impl Scope for FxHashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn capture(&self) -> Arc<Env> {
        Arc::new(Env {
            vars: self.clone(),
            parent: None,
        })
    }
}

impl Scope for Arc<Env> {
    fn lookup(&self, name: &str) -> Option<Value> {
        Env::lookup(self, name)
    }

    fn capture(&self) -> Arc<Env> {
        Arc::clone(self)
    }
}

/// The scope of one closure call: parameters and declarations on top of
/// the captured environment.
pub(crate) struct Frame {
    vars: FxHashMap<String, Value>,
    parent: Arc<Env>,
}

impl Frame {
    pub(crate) fn new(parent: Arc<Env>) -> Self {
        Self {
            vars: FxHashMap::default(),
            parent,
        }
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }
}

impl Scope for Frame {
    fn lookup(&self, name: &str) -> Option<Value> {
        match self.vars.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.lookup(name),
        }
    }

    fn capture(&self) -> Arc<Env> {
        Arc::new(Env {
            vars: self.vars.clone(),
            parent: Some(Arc::clone(&self.parent)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, i32)]) -> FxHashMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_frame_shadows_captured_scope() {
        let outer = table(&[("a", 1), ("b", 2)]);
        let mut frame = Frame::new(outer.capture());
        frame.bind("a", Value::from(10));

        assert_eq!(frame.lookup("a"), Some(Value::from(10)));
        assert_eq!(frame.lookup("b"), Some(Value::from(2)));
        assert_eq!(frame.lookup("c"), None);
    }

    #[test]
    fn test_nested_capture_keeps_chain() {
        let outer = table(&[("x", 1)]);
        let mut frame = Frame::new(outer.capture());
        frame.bind("y", Value::from(2));
        let env = frame.capture();

        assert_eq!(env.lookup("x"), Some(Value::from(1)));
        assert_eq!(env.lookup("y"), Some(Value::from(2)));
    }

    #[test]
    fn test_capture_is_a_snapshot() {
        let mut outer = table(&[("x", 1)]);
        let env = outer.capture();
        outer.insert("x".to_string(), Value::from(5));
        assert_eq!(env.lookup("x"), Some(Value::from(1)));
    }
}
