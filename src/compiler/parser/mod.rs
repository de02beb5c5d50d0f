//! Parser for directive expressions.
//!
//! Produces an [`Expr`] tree from the token stream of one directive's
//! expression text. Positions in errors are byte offsets into that text.

pub(crate) mod expr;
mod stmt;
#[cfg(test)]
mod tests;

pub use expr::errors::{ParseError, ParseErrorKind, ParseResult};

use super::ast::Expr;
use super::lexer::{Lexer, Token};
use super::syntax::SyntaxKind;

/// The parser for expression input.
pub struct Parser {
    /// The tokens to parse.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Length of the source, reported as the position of end-of-input errors.
    input_len: usize,
}

impl Parser {
    /// Creates a new parser from input text.
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            input_len: input.len(),
        })
    }

    /// Parses `input` as exactly one expression.
    pub fn parse_expression(input: &str) -> ParseResult<Expr> {
        let mut parser = Self::new(input)?;
        let expr = parser.parse_expr()?;
        parser.expect_eof()?;
        Ok(expr)
    }

    /// Parses `input` as between one and `max` comma separated expressions.
    pub fn parse_arguments(input: &str, max: usize) -> ParseResult<Vec<Expr>> {
        let mut parser = Self::new(input)?;
        let mut args = Vec::new();
        loop {
            if args.len() == max {
                return Err(ParseError::new(ParseErrorKind::ArgumentCount, parser.position())
                    .with_expected(&[&format!("at most {} argument(s)", max)]));
            }
            args.push(parser.parse_expr()?);
            if !parser.eat(SyntaxKind::Comma) {
                break;
            }
        }
        parser.expect_eof()?;
        Ok(args)
    }

    // =========================================================================
    // Token navigation
    // =========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<SyntaxKind> {
        self.current().map(|t| t.kind)
    }

    fn peek_kind(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.current().cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Byte position of the current token, or the end of input.
    fn position(&self) -> usize {
        self.current().map_or(self.input_len, |t| t.start)
    }

    /// Consumes a token of `kind` or fails with an error describing `expected`.
    fn expect(&mut self, kind: SyntaxKind, expected: &str) -> ParseResult<Token> {
        if self.at(kind) {
            if let Some(token) = self.consume() {
                return Ok(token);
            }
        }
        Err(self.error_here(&[expected]))
    }

    /// Consumes a closing delimiter or fails with a `missing` error.
    fn expect_closing(&mut self, kind: SyntaxKind, missing: ParseErrorKind) -> ParseResult<()> {
        if self.eat(kind) {
            return Ok(());
        }
        let mut err = ParseError::missing_closing(missing, self.position());
        if let Some(token) = self.current() {
            err = err.with_found(&format!("'{}'", token.text));
        }
        Err(err)
    }

    fn expect_eof(&self) -> ParseResult<()> {
        match self.current() {
            None => Ok(()),
            Some(token) => Err(ParseError::unexpected_token(
                token.start,
                &["end of expression"],
                &token.text,
            )),
        }
    }

    /// Builds an error for whatever sits at the current position.
    fn error_here(&self, expected: &[&str]) -> ParseError {
        match self.current() {
            Some(token) => ParseError::unexpected_token(token.start, expected, &token.text),
            None => ParseError::unexpected_eof(self.input_len, expected),
        }
    }
}
