//! Template compiler.
//!
//! - Scanner: splits source into literal text and `{{ ... }}` directives
//! - Directives: matches each directive against the directive forms
//! - Lexer/Parser: tokenize and parse the expression parts of directives
//! - Control blocks: balance openers and closers, patch jump targets

pub mod ast;
mod control_blocks;
mod directives;
pub mod error_fmt;
mod errors;
mod grammar;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod syntax;

use std::sync::Arc;

use tracing::debug;

pub use errors::{SyntaxError, SyntaxErrorKind};
pub use grammar::{Grammar, ShortcutForm, TagForm};
pub use ir::{CompiledUnit, Condition, Instruction, Loop, LoopKind, Statement};

use scanner::Segment;

/// Compiles template source with no tags or shortcuts configured.
pub fn compile(source: &str, path: &str) -> Result<CompiledUnit, SyntaxError> {
    compile_with(source, path, &Grammar::default())
}

/// Compiles template source using `grammar` for tag and shortcut forms.
pub fn compile_with(
    source: &str,
    path: &str,
    grammar: &Grammar,
) -> Result<CompiledUnit, SyntaxError> {
    let mut statements = Vec::new();

    for segment in scanner::scan(source) {
        match segment {
            Segment::Text { text, line, offset } => {
                statements.push(Statement::literal(&text, line, offset));
            }
            Segment::Directive(directive) => {
                let instruction = directives::compile_directive(&directive.text, grammar)
                    .map_err(|err| {
                        err.located(path, &directive.text, directive.line, directive.offset)
                    })?;
                statements.push(Statement {
                    line: directive.line,
                    offset: directive.offset,
                    directive: directive.text,
                    instruction,
                });
            }
        }
    }

    control_blocks::link(&mut statements).map_err(|err| {
        let statement = &statements[err.index];
        err.error.located(
            path,
            &statement.directive,
            statement.line,
            statement.offset,
        )
    })?;

    debug!(path, statements = statements.len(), "compiled template");

    Ok(CompiledUnit {
        path: path.to_string(),
        source: Arc::from(source),
        statements,
    })
}
