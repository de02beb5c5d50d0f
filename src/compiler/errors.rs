//! Compile-time errors.

use std::fmt;

use super::error_fmt::Diagnostic;
use super::parser::ParseError;

/// The kind of syntax error found while compiling a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// `{{ }}` with nothing inside.
    EmptyDirective,
    /// The directive's expression does not parse.
    InvalidExpression,
    /// A block, `put` or `exists` name is not an identifier.
    InvalidName,
    /// A `for` or `each` header is malformed.
    InvalidLoop,
    /// `name:content` used with a tag or shortcut that takes no content.
    ContentNotAccepted,
    /// A closing directive with nothing open.
    UnexpectedCloser,
    /// A closing directive that does not match the innermost open construct.
    MismatchedCloser,
    /// `else` or `else if` outside a conditional, or after its `else`.
    MisplacedElse,
    /// A construct still open at the end of the template.
    UnclosedBlock,
}

impl SyntaxErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::EmptyDirective => "empty directive",
            Self::InvalidExpression => "invalid expression",
            Self::InvalidName => "invalid name",
            Self::InvalidLoop => "invalid loop header",
            Self::ContentNotAccepted => "content not accepted",
            Self::UnexpectedCloser => "unexpected closing directive",
            Self::MismatchedCloser => "mismatched closing directive",
            Self::MisplacedElse => "misplaced else",
            Self::UnclosedBlock => "unclosed block",
        }
    }

    /// Returns a suggested fix for this error kind.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::EmptyDirective => Some("remove the empty braces or write an expression"),
            Self::InvalidName => Some("names must be identifiers such as `nav` or `main_menu`"),
            Self::InvalidLoop => Some("write `for value, key in source` or `each item, index in list`"),
            Self::ContentNotAccepted => Some("register the tag with content enabled"),
            Self::UnexpectedCloser | Self::MismatchedCloser | Self::UnclosedBlock => {
                Some("every `if`, `for`, `each` needs `end`; `block` needs `endblock`; `include:content` needs `endinclude`; `name:content` needs `endname`")
            }
            Self::MisplacedElse => Some("`else` and `else if` belong between `if` and `end`"),
            Self::InvalidExpression => None,
        }
    }
}

/// A syntax error located in a template.
///
/// Displays as `"{{directive}}" in /path on line N: reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Path of the template being compiled.
    pub path: String,
    /// 1-based line of the offending directive.
    pub line: usize,
    /// The offending directive's text.
    pub directive: String,
    pub kind: SyntaxErrorKind,
    /// What went wrong.
    pub reason: String,
    /// Byte offset of the error in the template source.
    pub offset: usize,
}

impl SyntaxError {
    /// Renders the error with the offending source line and a caret.
    pub fn diagnostic(&self, source: &str) -> String {
        let first_line = self.directive.lines().next().unwrap_or_default();
        let mut diagnostic = Diagnostic::new(&self.reason, source, self.offset)
            .path(&self.path)
            .annotation(format!("in {{{{{}}}}}", first_line));
        if let Some(help) = self.kind.suggestion() {
            diagnostic = diagnostic.help(help);
        }
        diagnostic.render()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{{{{{}}}}}\" in {} on line {}: {}",
            self.directive, self.path, self.line, self.reason
        )
    }
}

impl std::error::Error for SyntaxError {}

/// A directive-level error, positioned relative to the directive text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveError {
    pub kind: SyntaxErrorKind,
    pub reason: String,
    pub offset: usize,
}

impl DirectiveError {
    pub fn new(kind: SyntaxErrorKind, reason: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            reason: reason.into(),
            offset,
        }
    }

    /// Wraps an expression parse error found `offset` bytes into the directive.
    pub fn parse(err: ParseError, offset: usize) -> Self {
        Self {
            kind: SyntaxErrorKind::InvalidExpression,
            reason: err.to_message(),
            offset: offset + err.position,
        }
    }

    /// Locates the error in a template.
    pub fn located(self, path: &str, directive: &str, line: usize, directive_offset: usize) -> SyntaxError {
        SyntaxError {
            path: path.to_string(),
            line,
            directive: directive.to_string(),
            kind: self.kind,
            reason: self.reason,
            offset: directive_offset + self.offset,
        }
    }
}
