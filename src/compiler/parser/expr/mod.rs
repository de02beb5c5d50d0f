//! Pratt parser for expressions.
//!
//! `parse_expr_bp` drives the loop: a prefix or primary expression, then
//! postfix chains (`.x`, `?.x`, `[i]`, `(args)`), binary operators and
//! the conditional operator, each gated by its binding power.

pub(crate) mod errors;
pub(crate) mod operators;
pub(crate) mod precedence;
mod postfix;
mod primary;

use super::Parser;
use crate::compiler::ast::Expr;
use crate::compiler::syntax::SyntaxKind;
use errors::{ParseErrorKind, ParseResult};
use operators::{to_binary_op, to_unary_op};
use precedence::{infix_binding_power, is_postfix_start, prec};

impl Parser {
    /// Parses a full expression at the lowest binding power.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parses an expression whose operators bind at least as tightly as `min_bp`.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        while let Some(kind) = self.current_kind() {
            if is_postfix_start(kind) {
                if prec::CALL.left < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs)?;
                continue;
            }

            if kind == SyntaxKind::Question {
                if prec::CONDITIONAL.left < min_bp {
                    break;
                }
                self.bump();
                let consequent = self.parse_expr_bp(0)?;
                self.expect_closing(SyntaxKind::Colon, ParseErrorKind::MissingConditionalColon)?;
                let alternate = self.parse_expr_bp(prec::CONDITIONAL.right)?;
                lhs = Expr::Conditional {
                    test: Box::new(lhs),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                };
                continue;
            }

            let (Some(bp), Some(op)) = (infix_binding_power(kind), to_binary_op(kind)) else {
                break;
            };
            if bp.left < min_bp {
                break;
            }
            self.bump();
            let rhs = self.parse_expr_bp(bp.right)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        if let Some(op) = self.current_kind().and_then(to_unary_op) {
            self.bump();
            let operand = self.parse_expr_bp(prec::PREFIX)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }
}
