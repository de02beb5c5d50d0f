//! Primary expressions: literals, identifiers, grouping, arrays, objects,
//! template literals and function literals.

use std::sync::Arc;

use super::super::Parser;
use super::errors::{ParseError, ParseErrorKind, ParseResult};
use crate::compiler::ast::{Expr, FunctionBody, FunctionLit, Lit, Prop, PropKey, TemplatePart};
use crate::compiler::lexer::Token;
use crate::compiler::lexer::literals::{TemplateChunk, parse_number, split_template, unescape_string};
use crate::compiler::syntax::SyntaxKind;
use crate::value::format_number;

impl Parser {
    pub(super) fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.current().cloned() else {
            return Err(ParseError::unexpected_eof(self.input_len, &["expression"]));
        };

        match token.kind {
            SyntaxKind::Number => {
                self.bump();
                Ok(Expr::Lit(Lit::Number(number_value(&token)?)))
            }
            SyntaxKind::String => {
                self.bump();
                let value = unescape_string(&token.text, token.start)?;
                Ok(Expr::Lit(Lit::Str(Arc::from(value))))
            }
            SyntaxKind::Template => {
                self.bump();
                self.parse_template(&token)
            }
            SyntaxKind::TrueKw => {
                self.bump();
                Ok(Expr::Lit(Lit::Bool(true)))
            }
            SyntaxKind::FalseKw => {
                self.bump();
                Ok(Expr::Lit(Lit::Bool(false)))
            }
            SyntaxKind::NullKw => {
                self.bump();
                Ok(Expr::Lit(Lit::Null))
            }
            SyntaxKind::UndefinedKw => {
                self.bump();
                Ok(Expr::Lit(Lit::Undefined))
            }
            SyntaxKind::Ident => {
                self.bump();
                if self.eat(SyntaxKind::FatArrow) {
                    let body = self.parse_arrow_body()?;
                    return Ok(function(vec![token.text], body));
                }
                Ok(Expr::Ident(token.text))
            }
            SyntaxKind::LParen if self.is_arrow_head() => {
                let params = self.parse_params()?;
                self.expect(SyntaxKind::FatArrow, "'=>'")?;
                let body = self.parse_arrow_body()?;
                Ok(function(params, body))
            }
            SyntaxKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_closing(SyntaxKind::RParen, ParseErrorKind::MissingClosingParen)?;
                Ok(inner)
            }
            SyntaxKind::LBracket => {
                self.bump();
                let elements =
                    self.parse_elements(SyntaxKind::RBracket, ParseErrorKind::MissingClosingBracket)?;
                Ok(Expr::Array(elements))
            }
            SyntaxKind::LBrace => self.parse_object(),
            SyntaxKind::FunctionKw => {
                self.bump();
                self.eat(SyntaxKind::Ident);
                let params = self.parse_params()?;
                self.expect(SyntaxKind::LBrace, "'{'")?;
                let body = FunctionBody::Block(self.parse_block_statements()?);
                Ok(function(params, body))
            }
            _ => Err(ParseError::new(ParseErrorKind::ExpectedExpression, token.start)
                .with_found(&format!("'{}'", token.text))),
        }
    }

    /// Looks ahead from `(` to its matching `)` and checks for `=>`.
    fn is_arrow_head(&self) -> bool {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[self.pos..].iter().enumerate() {
            match token.kind {
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.peek_kind(offset + 1) == Some(SyntaxKind::FatArrow);
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Parses `(a, b, c)` as a parameter list.
    fn parse_params(&mut self) -> ParseResult<Vec<String>> {
        self.expect(SyntaxKind::LParen, "'('")?;
        let mut params = Vec::new();
        loop {
            if self.eat(SyntaxKind::RParen) {
                return Ok(params);
            }
            match self.current() {
                Some(token) if token.kind == SyntaxKind::Ident => {
                    params.push(token.text.clone());
                    self.bump();
                }
                Some(token) => {
                    return Err(ParseError::new(ParseErrorKind::InvalidArrowParams, token.start)
                        .with_found(&format!("'{}'", token.text))
                        .with_expected(&["parameter name"]));
                }
                None => {
                    return Err(ParseError::missing_closing(
                        ParseErrorKind::MissingClosingParen,
                        self.input_len,
                    ));
                }
            }
            if !self.eat(SyntaxKind::Comma) {
                self.expect_closing(SyntaxKind::RParen, ParseErrorKind::MissingClosingParen)?;
                return Ok(params);
            }
        }
    }

    fn parse_arrow_body(&mut self) -> ParseResult<FunctionBody> {
        if self.eat(SyntaxKind::LBrace) {
            return Ok(FunctionBody::Block(self.parse_block_statements()?));
        }
        Ok(FunctionBody::Expr(self.parse_expr()?))
    }

    fn parse_object(&mut self) -> ParseResult<Expr> {
        self.expect(SyntaxKind::LBrace, "'{'")?;
        let mut props = Vec::new();

        loop {
            if self.eat(SyntaxKind::RBrace) {
                break;
            }
            if self.eat(SyntaxKind::DotDotDot) {
                props.push(Prop::Spread(self.parse_expr()?));
            } else {
                props.push(self.parse_prop()?);
            }
            if !self.eat(SyntaxKind::Comma) {
                self.expect_closing(SyntaxKind::RBrace, ParseErrorKind::MissingClosingBrace)?;
                break;
            }
        }

        Ok(Expr::Object(props))
    }

    fn parse_prop(&mut self) -> ParseResult<Prop> {
        let Some(token) = self.consume() else {
            return Err(ParseError::missing_closing(
                ParseErrorKind::MissingClosingBrace,
                self.input_len,
            ));
        };

        let key = match token.kind {
            kind if kind.is_property_name() => {
                if kind == SyntaxKind::Ident
                    && matches!(
                        self.current_kind(),
                        Some(SyntaxKind::Comma | SyntaxKind::RBrace)
                    )
                {
                    return Ok(Prop::Shorthand(token.text));
                }
                if self.at(SyntaxKind::LParen) {
                    let params = self.parse_params()?;
                    self.expect(SyntaxKind::LBrace, "'{'")?;
                    let body = FunctionBody::Block(self.parse_block_statements()?);
                    return Ok(Prop::KeyValue(
                        PropKey::Named(token.text),
                        function(params, body),
                    ));
                }
                PropKey::Named(token.text)
            }
            SyntaxKind::String => PropKey::Named(unescape_string(&token.text, token.start)?),
            SyntaxKind::Number => PropKey::Named(format_number(number_value(&token)?)),
            SyntaxKind::LBracket => {
                let key = self.parse_expr()?;
                self.expect_closing(SyntaxKind::RBracket, ParseErrorKind::MissingClosingBracket)?;
                PropKey::Computed(key)
            }
            _ => {
                return Err(ParseError::new(ParseErrorKind::InvalidPropertyName, token.start)
                    .with_found(&format!("'{}'", token.text)));
            }
        };

        self.expect(SyntaxKind::Colon, "':'")?;
        Ok(Prop::KeyValue(key, self.parse_expr()?))
    }

    fn parse_template(&mut self, token: &Token) -> ParseResult<Expr> {
        let mut parts = Vec::new();
        for chunk in split_template(&token.text, token.start)? {
            match chunk {
                TemplateChunk::Text(text) => parts.push(TemplatePart::Text(text)),
                TemplateChunk::Substitution { source, start } => {
                    let expr =
                        Parser::parse_expression(&source).map_err(|err| err.shifted(start))?;
                    parts.push(TemplatePart::Expr(expr));
                }
            }
        }
        Ok(Expr::Template(parts))
    }
}

fn number_value(token: &Token) -> ParseResult<f64> {
    parse_number(&token.text).ok_or_else(|| {
        ParseError::new(ParseErrorKind::Lex, token.start)
            .with_found(&format!("'{}'", token.text))
    })
}

fn function(params: Vec<String>, body: FunctionBody) -> Expr {
    Expr::Function(Arc::new(FunctionLit { params, body }))
}
