//! Executes a compiled template against a render context.
//!
//! Each activation owns its output buffer, a stack of capture frames for
//! blocks and content calls, and a stack of content calls waiting for
//! their closing directive. Names resolve against one flat table built
//! from the context on entry; loop variables and closed blocks are written
//! back into it.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::builtins;
use super::context::RenderContext;
use super::encode::encode;
use super::errors::EvalError;
use super::eval::evaluate;
use crate::compiler::ast::Expr;
use crate::compiler::{CompiledUnit, Condition, Instruction, Loop, LoopKind, Statement};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::tags::CallSite;
use crate::value::{Object, Value};

/// Renders `unit` and returns its output.
pub(crate) fn run(engine: &Engine, unit: &CompiledUnit, ctx: &mut RenderContext) -> Result<String> {
    trace!(path = %unit.path, depth = ctx.depth, "executing template");
    let mut activation = Activation {
        engine,
        unit,
        scope: ctx.flatten(),
        buffer: String::new(),
        captures: Vec::new(),
        pending: Vec::new(),
    };
    activation.exec(ctx, 0, unit.statements.len())?;
    Ok(activation.buffer)
}

/// Output being collected for a block or for the content of a call.
#[derive(Debug)]
struct CaptureFrame {
    name: String,
    text: String,
}

impl CaptureFrame {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            text: String::new(),
        }
    }
}

/// A content call waiting for its closing directive.
#[derive(Debug)]
enum Pending {
    Include { path: String, data: Object },
    Tag { first_arg: Value, data: Object },
    Shortcut { data: Object },
}

impl Pending {
    fn data_mut(&mut self) -> &mut Object {
        match self {
            Self::Include { data, .. } | Self::Tag { data, .. } | Self::Shortcut { data } => data,
        }
    }
}

struct Activation<'a> {
    engine: &'a Engine,
    unit: &'a CompiledUnit,
    scope: FxHashMap<String, Value>,
    buffer: String,
    captures: Vec<CaptureFrame>,
    pending: Vec<Pending>,
}

impl Activation<'_> {
    /// Runs statements `start..end`.
    fn exec(&mut self, ctx: &mut RenderContext, start: usize, end: usize) -> Result<()> {
        let unit = self.unit;
        let mut pc = start;

        while pc < end {
            let statement = &unit.statements[pc];
            match &statement.instruction {
                Instruction::Literal(text) => self.emit(text),
                Instruction::Eval(expr) => {
                    let text = self.eval(expr, statement)?.to_text();
                    self.emit(&text);
                }
                Instruction::Encode(expr) => {
                    let text = encode(&self.eval(expr, statement)?.to_text());
                    self.emit(&text);
                }
                Instruction::Put(name) => {
                    if let Some(value) = self.bound(name) {
                        let text = value.to_text();
                        self.emit(&text);
                    }
                }
                Instruction::Comment | Instruction::End => {}
                Instruction::If { test, alt } => {
                    pc = if self.test(test, statement)? {
                        pc + 1
                    } else {
                        self.select_branch(*alt)?
                    };
                    continue;
                }
                Instruction::ElseIf { end, .. } | Instruction::Else { end } => {
                    pc = *end;
                    continue;
                }
                Instruction::Loop(header) => {
                    self.run_loop(ctx, pc, header, statement)?;
                    pc = header.end + 1;
                    continue;
                }
                Instruction::BlockOpen(name) => self.captures.push(CaptureFrame::new(name)),
                Instruction::BlockClose => self.close_block(ctx),
                Instruction::Extends(path) => self.extends(ctx, path, statement)?,
                Instruction::Include {
                    path,
                    data,
                    content,
                } => {
                    let path = self.path(path, statement)?;
                    let data = self.data(data.as_ref(), statement)?;
                    if *content {
                        self.open_content(Pending::Include { path, data });
                    } else {
                        let text = self.include(ctx, &path, data)?;
                        self.emit(&text);
                    }
                }
                Instruction::IncludeEnd => {
                    if let Some(Pending::Include { path, data }) = self.close_content() {
                        let text = self.include(ctx, &path, data)?;
                        self.emit(&text);
                    }
                }
                Instruction::Tag {
                    name,
                    first_arg,
                    data,
                    content,
                } => {
                    let first_arg = self.eval(first_arg, statement)?;
                    let data = self.data(data.as_ref(), statement)?;
                    if *content {
                        self.open_content(Pending::Tag { first_arg, data });
                    } else {
                        let text = self.engine.render_tag(name, first_arg, data, &self.site(ctx, statement))?;
                        self.emit(&text);
                    }
                }
                Instruction::TagEnd(name) => {
                    if let Some(Pending::Tag { first_arg, data }) = self.close_content() {
                        let text = self.engine.render_tag(name, first_arg, data, &self.site(ctx, statement))?;
                        self.emit(&text);
                    }
                }
                Instruction::Shortcut {
                    name,
                    data,
                    content,
                } => {
                    let data = self.data(data.as_ref(), statement)?;
                    if *content {
                        self.open_content(Pending::Shortcut { data });
                    } else {
                        let text = self.engine.render_shortcut(name, data, &self.site(ctx, statement))?;
                        self.emit(&text);
                    }
                }
                Instruction::ShortcutEnd(name) => {
                    if let Some(Pending::Shortcut { data }) = self.close_content() {
                        let text = self.engine.render_shortcut(name, data, &self.site(ctx, statement))?;
                        self.emit(&text);
                    }
                }
            }
            pc += 1;
        }
        Ok(())
    }

    /// Appends to the innermost capture, or the output when none is open.
    fn emit(&mut self, text: &str) {
        match self.captures.last_mut() {
            Some(frame) => frame.text.push_str(text),
            None => self.buffer.push_str(text),
        }
    }

    fn eval(&self, expr: &Expr, statement: &Statement) -> Result<Value> {
        evaluate(expr, &self.scope).map_err(|source| self.error(source, statement))
    }

    fn error(&self, source: EvalError, statement: &Statement) -> Error {
        Error::Eval {
            path: self.unit.path.clone(),
            line: statement.line,
            directive: statement.directive.clone(),
            source,
        }
    }

    /// The value bound to `name`, unless it is unbound or `undefined`.
    fn bound(&self, name: &str) -> Option<&Value> {
        self.scope.get(name).filter(|value| !value.is_undefined())
    }

    fn test(&self, condition: &Condition, statement: &Statement) -> Result<bool> {
        Ok(match condition {
            Condition::Truthy(expr) => self.eval(expr, statement)?.is_truthy(),
            Condition::Exists(name) => self.bound(name).is_some(),
            Condition::NotExists(name) => self.bound(name).is_none(),
        })
    }

    /// Follows a failed test to the first branch whose test passes, an
    /// `else`, or the end of the conditional. Returns where to continue.
    fn select_branch(&self, mut pc: usize) -> Result<usize> {
        loop {
            let statement = &self.unit.statements[pc];
            match &statement.instruction {
                Instruction::ElseIf { test, alt, .. } => {
                    if self.eval(test, statement)?.is_truthy() {
                        return Ok(pc + 1);
                    }
                    pc = *alt;
                }
                _ => return Ok(pc + 1),
            }
        }
    }

    fn run_loop(
        &mut self,
        ctx: &mut RenderContext,
        pc: usize,
        header: &Loop,
        statement: &Statement,
    ) -> Result<()> {
        let source = self.eval(&header.source, statement)?;
        let entries = match header.kind {
            LoopKind::For => builtins::entries(&source)
                .into_iter()
                .map(|(key, value)| (Value::from(key), value))
                .collect(),
            LoopKind::Each => {
                sequence(&source).map_err(|source| self.error(source, statement))?
            }
        };

        for (key, value) in entries {
            self.scope.insert(header.value.clone(), value);
            if let Some(name) = &header.key {
                self.scope.insert(name.clone(), key);
            }
            self.exec(ctx, pc + 1, header.end)?;
        }
        Ok(())
    }

    /// Hands a closed block to the pending content call, or publishes it
    /// for this template and every template later in the chain.
    fn close_block(&mut self, ctx: &mut RenderContext) {
        let Some(frame) = self.captures.pop() else {
            return;
        };
        let value = Value::from(frame.text);
        match self.pending.last_mut() {
            Some(call) => {
                call.data_mut().insert(frame.name, value);
            }
            None => {
                self.scope.insert(frame.name.clone(), value.clone());
                ctx.globals.insert(frame.name, value);
            }
        }
    }

    fn open_content(&mut self, call: Pending) {
        self.pending.push(call);
        self.captures.push(CaptureFrame::new("content"));
    }

    /// Ends a content call: its captured output becomes `data.content`.
    fn close_content(&mut self) -> Option<Pending> {
        let content = self.captures.pop()?.text;
        let mut call = self.pending.pop()?;
        call.data_mut().insert("content".to_string(), Value::from(content));
        Some(call)
    }

    fn extends(&mut self, ctx: &mut RenderContext, path: &Expr, statement: &Statement) -> Result<()> {
        let target = self.path(path, statement)?;
        let body = std::mem::take(&mut self.buffer);
        trace!(from = %self.unit.path, layout = %target, "extending layout");
        ctx.globals.insert("content".to_string(), Value::from(body));
        self.buffer = self.engine.render_path(&target, &self.unit.path, ctx)?;
        Ok(())
    }

    fn include(&self, ctx: &mut RenderContext, path: &str, data: Object) -> Result<String> {
        trace!(from = %self.unit.path, include = %path, "including template");
        ctx.locals.push(data);
        let result = self.engine.render_path(path, &self.unit.path, ctx);
        ctx.locals.pop();
        result
    }

    fn path(&self, expr: &Expr, statement: &Statement) -> Result<String> {
        match self.eval(expr, statement)? {
            Value::String(path) => Ok(path.to_string()),
            other => Err(self.error(
                EvalError::InvalidPath {
                    found: other.type_of(),
                },
                statement,
            )),
        }
    }

    /// Evaluates optional call data. Anything but an object is an empty object.
    fn data(&self, expr: Option<&Expr>, statement: &Statement) -> Result<Object> {
        match expr {
            Some(expr) => Ok(self.eval(expr, statement)?.into_object()),
            None => Ok(Object::new()),
        }
    }

    fn site<'s>(&'s self, ctx: &RenderContext, statement: &'s Statement) -> CallSite<'s> {
        CallSite {
            path: &self.unit.path,
            line: statement.line,
            directive: &statement.directive,
            depth: ctx.depth,
        }
    }
}

/// Largest `length` an array-like object may claim in `each`.
const MAX_SEQUENCE_LENGTH: usize = 1 << 24;

/// `(index, value)` pairs for `each`: positions `0..length`.
fn sequence(source: &Value) -> std::result::Result<Vec<(Value, Value)>, EvalError> {
    let indexed = |items: Vec<Value>| -> Vec<(Value, Value)> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, value)| (Value::from(i), value))
            .collect()
    };
    match source {
        Value::Undefined | Value::Null => Err(EvalError::NotIterable {
            target: if source.is_undefined() { "undefined" } else { "null" },
        }),
        Value::Array(items) => Ok(indexed(items.to_vec())),
        Value::String(s) => Ok(indexed(s.chars().map(|c| Value::from(c.to_string())).collect())),
        Value::Object(map) => {
            let length = map.get("length").map_or(0.0, Value::to_number);
            let length = if length.is_nan() || length < 0.0 { 0 } else { length as usize };
            if length > MAX_SEQUENCE_LENGTH {
                return Err(EvalError::NotIterable {
                    target: "array-like object of invalid length",
                });
            }
            Ok(indexed(
                (0..length)
                    .map(|i| map.get(&i.to_string()).cloned().unwrap_or_default())
                    .collect(),
            ))
        }
        _ => Ok(Vec::new()),
    }
}
