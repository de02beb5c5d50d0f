//! Instruction list produced by the template compiler.
//!
//! A compiled template is a flat sequence of [`Statement`]s. Control flow
//! is expressed with absolute jump targets into that sequence, filled in by
//! the linker once every construct is closed. Until then targets hold
//! [`UNPATCHED`].

use std::sync::Arc;

use super::ast::Expr;

/// Placeholder jump target for constructs not yet closed.
pub const UNPATCHED: usize = usize::MAX;

/// The test of an `if`, `exists` or `existsNot` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{{if expr}}`
    Truthy(Expr),
    /// `{{exists name}}`
    Exists(String),
    /// `{{existsNot name}}`
    NotExists(String),
}

/// Which loop directive opened a [`Loop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `{{for value, key in source}}`: every key of an object or array.
    For,
    /// `{{each value, index in source}}`: indices `0..source.length`.
    Each,
}

/// A `for` or `each` loop header.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub kind: LoopKind,
    /// Name bound to each value.
    pub value: String,
    /// Name bound to each key or index, when given.
    pub key: Option<String>,
    pub source: Expr,
    /// Index of the matching `End`.
    pub end: usize,
}

/// One executable step of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Raw text copied to the output.
    Literal(String),
    /// `{{expr}}`: evaluate and emit as text.
    Eval(Expr),
    /// `{{:expr}}`: evaluate, HTML-encode and emit.
    Encode(Expr),
    /// `{{put name}}`: emit the binding, or nothing when unbound.
    Put(String),
    /// `{{* ... *}}`
    Comment,
    /// Opens a conditional. Jumps to `alt` when the test fails.
    If { test: Condition, alt: usize },
    /// Tested only when reached by a jump. Reached in sequence it jumps to `end`.
    ElseIf { test: Expr, alt: usize, end: usize },
    /// Reached in sequence it jumps to `end`.
    Else { end: usize },
    /// Closes a conditional or loop.
    End,
    Loop(Loop),
    /// Starts capturing output into the named block.
    BlockOpen(String),
    BlockClose,
    /// Render the current output into a layout. Always last when present.
    Extends(Expr),
    /// Render another template with optional data. With `content`, output
    /// up to the matching `IncludeEnd` becomes its `content` value.
    Include {
        path: Expr,
        data: Option<Expr>,
        content: bool,
    },
    IncludeEnd,
    /// Call a registered tag.
    Tag {
        name: String,
        first_arg: Expr,
        data: Option<Expr>,
        content: bool,
    },
    TagEnd(String),
    /// Call a configured shortcut alias.
    Shortcut {
        name: String,
        data: Option<Expr>,
        content: bool,
    },
    ShortcutEnd(String),
}

impl Instruction {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Eval(_) => "eval",
            Self::Encode(_) => "encode",
            Self::Put(_) => "put",
            Self::Comment => "comment",
            Self::If { .. } => "if",
            Self::ElseIf { .. } => "else if",
            Self::Else { .. } => "else",
            Self::End => "end",
            Self::Loop(l) => match l.kind {
                LoopKind::For => "for",
                LoopKind::Each => "each",
            },
            Self::BlockOpen(_) => "block",
            Self::BlockClose => "endblock",
            Self::Extends(_) => "extends",
            Self::Include { .. } => "include",
            Self::IncludeEnd => "endinclude",
            Self::Tag { .. } => "tag",
            Self::TagEnd(_) => "tag end",
            Self::Shortcut { .. } => "shortcut",
            Self::ShortcutEnd(_) => "shortcut end",
        }
    }
}

/// An instruction with the location of the directive it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based line of the directive's `{{`.
    pub line: usize,
    /// Byte offset of the directive text in the template source.
    pub offset: usize,
    /// Trimmed directive text, empty for literals.
    pub directive: String,
    pub instruction: Instruction,
}

impl Statement {
    pub(crate) fn literal(text: &str, line: usize, offset: usize) -> Self {
        Self {
            line,
            offset,
            directive: String::new(),
            instruction: Instruction::Literal(text.to_string()),
        }
    }
}

/// The compiled form of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    pub(crate) path: String,
    pub(crate) source: Arc<str>,
    pub(crate) statements: Vec<Statement>,
}

impl CompiledUnit {
    /// Path the unit was compiled for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The template source this unit was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns true if the unit renders into a layout.
    pub fn extends(&self) -> bool {
        matches!(
            self.statements.last().map(|s| &s.instruction),
            Some(Instruction::Extends(_))
        )
    }
}
