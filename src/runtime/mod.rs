//! Template execution.
//!
//! - Eval: expression evaluation with closures and builtins
//! - Context: globals and local frames shared across an extends/include chain
//! - Interpreter: runs a compiled template's statements

mod builtins;
mod context;
mod encode;
mod errors;
mod eval;
pub(crate) mod interpreter;
pub(crate) mod scope;

pub use context::RenderContext;
pub use encode::encode;
pub use errors::{EvalError, EvalResult};
pub use eval::MAX_CALL_DEPTH;
