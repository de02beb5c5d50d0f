//! Beard: a template engine with layouts, blocks, includes and pluggable tags.
//!
//! Templates are plain text with directives between `{{` and `}}`. Each
//! template is compiled once into a flat list of statements, cached by its
//! resolved path, and then executed against JSON-like data.
//!
//! # Directives
//!
//! ```text
//! {{expr}}                     evaluate and insert
//! {{:expr}}                    evaluate, HTML-encode and insert
//! {{put name}}                 insert `name` when it is bound
//! {{if cond}} {{else if cond}} {{else}} {{end}}
//! {{exists name}} {{existsNot name}}
//! {{for value, key in obj}} {{each item, index in arr}} {{end}}
//! {{block name}} ... {{endblock}}
//! {{extends 'layout'}}
//! {{include 'path', data}}     {{include:content 'path'}} ... {{endinclude}}
//! {{tagname arg, data}}        {{tagname:content arg}} ... {{endtagname}}
//! {{@alias data}}
//! {{* comment *}}
//! ```
//!
//! # Architecture
//!
//! - [`compiler`]: scanner, directive matcher, expression lexer and parser,
//!   jump linking
//! - [`runtime`]: expression evaluation, builtins and the statement interpreter
//! - [`Engine`]: template lookup, the compiled cache, tags and shortcuts
//!
//! # Example
//!
//! ```
//! use beard::{Engine, MemorySource};
//! use serde_json::json;
//!
//! let source = MemorySource::new()
//!     .with_template("/layout", "<main>{{content}}</main>")
//!     .with_template("/page", "{{extends 'layout'}}Hi {{:name}}");
//!
//! let engine = Engine::new(source);
//! let html = engine.render("/page", json!({"name": "<b>"})).unwrap();
//! assert_eq!(html, "<main>Hi &#60;b&#62;</main>");
//! ```

pub mod cache;
pub mod compiler;
pub mod config;
mod engine;
mod error;
pub mod path;
pub mod runtime;
mod source;
mod tags;
pub mod value;

pub use cache::TemplateCache;
pub use compiler::{CompiledUnit, Grammar, SyntaxError, SyntaxErrorKind, compile, compile_with};
pub use config::{EngineConfig, ShortcutConfig};
pub use engine::{Engine, EngineBuilder};
pub use error::{Error, Result};
pub use runtime::{EvalError, RenderContext, encode};
pub use source::{MemorySource, TemplateSource};
pub use tags::{TagDefinition, TagEngine, TagRegistry, TagRenderer};
pub use value::{Function, Object, Value};
