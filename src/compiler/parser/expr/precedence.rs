//! Operator precedence and binding power for the Pratt parser.
//!
//! Levels follow the ECMAScript operator table, restricted to the operators
//! the expression language supports. There is no comma operator: commas
//! only separate arguments and literal elements.

use crate::compiler::syntax::SyntaxKind;

/// Binding power for operators in Pratt parser style.
///
/// Using (left, right) pairs enables both left and right associativity:
/// - Left-associative: `left < right` (e.g., `a + b + c` = `(a + b) + c`)
/// - Right-associative: `left > right` (e.g., `a ** b ** c` = `a ** (b ** c)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPower {
    /// Left binding power - compared against previous operator's right bp.
    pub left: u8,
    /// Right binding power - compared against next operator's left bp.
    pub right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    #[inline]
    pub const fn left(power: u8) -> Self {
        Self {
            left: power,
            right: power + 1,
        }
    }

    /// Creates a right-associative binding power.
    #[inline]
    pub const fn right(power: u8) -> Self {
        Self {
            left: power + 1,
            right: power,
        }
    }
}

/// Precedence levels. Higher numbers bind tighter.
pub mod prec {
    use super::BindingPower;

    /// Conditional operator (`?:`), right associative.
    pub const CONDITIONAL: BindingPower = BindingPower::right(6);

    /// Nullish coalescing (`??`).
    pub const NULLISH: BindingPower = BindingPower::left(8);

    /// Logical OR (`||`).
    pub const LOGICAL_OR: BindingPower = BindingPower::left(10);

    /// Logical AND (`&&`).
    pub const LOGICAL_AND: BindingPower = BindingPower::left(12);

    /// Equality (`==`, `!=`, `===`, `!==`).
    pub const EQUALITY: BindingPower = BindingPower::left(20);

    /// Relational (`<`, `>`, `<=`, `>=`, `in`).
    pub const RELATIONAL: BindingPower = BindingPower::left(22);

    /// Additive (`+`, `-`).
    pub const ADDITIVE: BindingPower = BindingPower::left(26);

    /// Multiplicative (`*`, `/`, `%`).
    pub const MULTIPLICATIVE: BindingPower = BindingPower::left(28);

    /// Exponentiation (`**`), right associative.
    pub const EXPONENT: BindingPower = BindingPower::right(30);

    /// Prefix unary operators (`!`, `-`, `+`, `typeof`).
    pub const PREFIX: u8 = 32;

    /// Call, member access and optional chain.
    pub const CALL: BindingPower = BindingPower::left(36);
}

/// Gets the infix binding power for a token.
///
/// Returns `None` for tokens that are not binary operators. The conditional
/// `?` and postfix operators are handled by the parser directly.
pub fn infix_binding_power(kind: SyntaxKind) -> Option<BindingPower> {
    match kind {
        SyntaxKind::QuestionQuestion => Some(prec::NULLISH),
        SyntaxKind::PipePipe => Some(prec::LOGICAL_OR),
        SyntaxKind::AmpersandAmpersand => Some(prec::LOGICAL_AND),
        SyntaxKind::EqEq | SyntaxKind::EqEqEq | SyntaxKind::NotEq | SyntaxKind::NotEqEq => {
            Some(prec::EQUALITY)
        }
        SyntaxKind::Lt | SyntaxKind::LtEq | SyntaxKind::Gt | SyntaxKind::GtEq | SyntaxKind::InKw => {
            Some(prec::RELATIONAL)
        }
        SyntaxKind::Plus | SyntaxKind::Minus => Some(prec::ADDITIVE),
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => Some(prec::MULTIPLICATIVE),
        SyntaxKind::StarStar => Some(prec::EXPONENT),
        _ => None,
    }
}

/// Checks if a token starts a postfix chain (`.`, `?.`, `[`, `(`).
pub fn is_postfix_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Dot | SyntaxKind::QuestionDot | SyntaxKind::LBracket | SyntaxKind::LParen
    )
}
