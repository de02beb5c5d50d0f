//! Statements inside function bodies.
//!
//! Only what callbacks passed to `map`/`filter` typically need: local
//! declarations, expression statements and `return`.

use super::Parser;
use super::expr::errors::{ParseError, ParseErrorKind, ParseResult};
use crate::compiler::ast::Stmt;
use crate::compiler::syntax::SyntaxKind;

impl Parser {
    /// Parses statements up to and including the closing `}`. The opening
    /// brace has already been consumed.
    pub(super) fn parse_block_statements(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(SyntaxKind::Semicolon) {}
            if self.eat(SyntaxKind::RBrace) {
                return Ok(statements);
            }
            if self.at_eof() {
                return Err(ParseError::missing_closing(
                    ParseErrorKind::MissingClosingBrace,
                    self.position(),
                ));
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            Some(kind) if kind.is_declaration() => {
                self.bump();
                let name = match self.current() {
                    Some(token) if token.kind == SyntaxKind::Ident => token.text.clone(),
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::ExpectedIdentifier,
                            self.position(),
                        ));
                    }
                };
                self.bump();
                let init = if self.eat(SyntaxKind::Eq) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Ok(Stmt::Declare { name, init })
            }
            Some(SyntaxKind::ReturnKw) => {
                self.bump();
                if matches!(
                    self.current_kind(),
                    None | Some(SyntaxKind::Semicolon | SyntaxKind::RBrace)
                ) {
                    return Ok(Stmt::Return(None));
                }
                Ok(Stmt::Return(Some(self.parse_expr()?)))
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }
}
