//! Member access, indexing and calls.

use super::super::Parser;
use super::errors::{ParseError, ParseErrorKind, ParseResult};
use crate::compiler::ast::{Element, Expr};
use crate::compiler::syntax::SyntaxKind;

impl Parser {
    /// Parses one postfix operation applied to `lhs`.
    pub(super) fn parse_postfix(&mut self, lhs: Expr) -> ParseResult<Expr> {
        let Some(token) = self.consume() else {
            return Err(self.error_here(&["'.'", "'['", "'('"]));
        };

        match token.kind {
            SyntaxKind::Dot => {
                let property = self.parse_property_name()?;
                Ok(Expr::Member {
                    object: Box::new(lhs),
                    property,
                    optional: false,
                })
            }
            SyntaxKind::QuestionDot => {
                if self.eat(SyntaxKind::LParen) {
                    let args = self.parse_elements(SyntaxKind::RParen, ParseErrorKind::MissingClosingParen)?;
                    Ok(Expr::Call {
                        callee: Box::new(lhs),
                        args,
                        optional: true,
                    })
                } else if self.eat(SyntaxKind::LBracket) {
                    self.parse_index(lhs, true)
                } else {
                    let property = self.parse_property_name()?;
                    Ok(Expr::Member {
                        object: Box::new(lhs),
                        property,
                        optional: true,
                    })
                }
            }
            SyntaxKind::LBracket => self.parse_index(lhs, false),
            SyntaxKind::LParen => {
                let args = self.parse_elements(SyntaxKind::RParen, ParseErrorKind::MissingClosingParen)?;
                Ok(Expr::Call {
                    callee: Box::new(lhs),
                    args,
                    optional: false,
                })
            }
            _ => Err(ParseError::unexpected_token(
                token.start,
                &["'.'", "'['", "'('"],
                &token.text,
            )),
        }
    }

    fn parse_index(&mut self, object: Expr, optional: bool) -> ParseResult<Expr> {
        let index = self.parse_expr()?;
        self.expect_closing(SyntaxKind::RBracket, ParseErrorKind::MissingClosingBracket)?;
        Ok(Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            optional,
        })
    }

    fn parse_property_name(&mut self) -> ParseResult<String> {
        match self.current() {
            Some(token) if token.kind.is_property_name() => {
                let name = token.text.clone();
                self.bump();
                Ok(name)
            }
            Some(token) => Err(ParseError::new(ParseErrorKind::MissingPropertyName, token.start)
                .with_found(&format!("'{}'", token.text))),
            None => Err(ParseError::new(ParseErrorKind::MissingPropertyName, self.position())),
        }
    }

    /// Parses a comma separated element list up to `close`. The opening
    /// delimiter has already been consumed. Trailing commas are accepted.
    pub(super) fn parse_elements(
        &mut self,
        close: SyntaxKind,
        missing: ParseErrorKind,
    ) -> ParseResult<Vec<Element>> {
        let mut elements = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(elements);
            }
            if self.at_eof() {
                return Err(ParseError::missing_closing(missing, self.position()));
            }
            if self.eat(SyntaxKind::DotDotDot) {
                elements.push(Element::Spread(self.parse_expr()?));
            } else {
                elements.push(Element::Item(self.parse_expr()?));
            }
            if !self.eat(SyntaxKind::Comma) {
                self.expect_closing(close, missing)?;
                return Ok(elements);
            }
        }
    }
}
