//! Token to operator mappings.

use crate::compiler::ast::{BinaryOp, UnaryOp};
use crate::compiler::syntax::SyntaxKind;

/// Maps a token to its `BinaryOp`.
pub fn to_binary_op(kind: SyntaxKind) -> Option<BinaryOp> {
    Some(match kind {
        SyntaxKind::Plus => BinaryOp::Add,
        SyntaxKind::Minus => BinaryOp::Sub,
        SyntaxKind::Star => BinaryOp::Mul,
        SyntaxKind::Slash => BinaryOp::Div,
        SyntaxKind::Percent => BinaryOp::Mod,
        SyntaxKind::StarStar => BinaryOp::Exp,
        SyntaxKind::EqEq => BinaryOp::EqEq,
        SyntaxKind::NotEq => BinaryOp::NotEq,
        SyntaxKind::EqEqEq => BinaryOp::EqEqEq,
        SyntaxKind::NotEqEq => BinaryOp::NotEqEq,
        SyntaxKind::Lt => BinaryOp::Lt,
        SyntaxKind::LtEq => BinaryOp::Le,
        SyntaxKind::Gt => BinaryOp::Gt,
        SyntaxKind::GtEq => BinaryOp::Ge,
        SyntaxKind::AmpersandAmpersand => BinaryOp::And,
        SyntaxKind::PipePipe => BinaryOp::Or,
        SyntaxKind::QuestionQuestion => BinaryOp::NullishCoalesce,
        SyntaxKind::InKw => BinaryOp::In,
        _ => return None,
    })
}

/// Maps a token to its prefix `UnaryOp`.
pub fn to_unary_op(kind: SyntaxKind) -> Option<UnaryOp> {
    Some(match kind {
        SyntaxKind::Bang => UnaryOp::Not,
        SyntaxKind::Minus => UnaryOp::Minus,
        SyntaxKind::Plus => UnaryOp::Plus,
        SyntaxKind::TypeofKw => UnaryOp::TypeOf,
        _ => return None,
    })
}
