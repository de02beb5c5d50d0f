//! Expression tree for directive expressions.

use std::sync::Arc;

/// Binary operators, short-circuiting ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    NullishCoalesce,
    In,
}

impl BinaryOp {
    /// Returns true for `&&`, `||` and `??`.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::NullishCoalesce)
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    TypeOf,
}

/// A literal value written in the expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Number(f64),
    Str(Arc<str>),
    Bool(bool),
    Null,
    Undefined,
}

/// A part of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Expr(Expr),
}

/// An element of an array literal or an argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Item(Expr),
    Spread(Expr),
}

/// A key in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Named(String),
    Computed(Expr),
}

/// An entry in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    KeyValue(PropKey, Expr),
    Shorthand(String),
    Spread(Expr),
}

/// A function or arrow function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub params: Vec<String>,
    pub body: FunctionBody,
}

/// The body of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// `(x) => x + 1`
    Expr(Expr),
    /// `(x) => { const y = x; return y; }`
    Block(Vec<Stmt>),
}

/// Statements allowed inside function bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `const name = init`, `let name`, `var name = init`
    Declare { name: String, init: Option<Expr> },
    Expr(Expr),
    Return(Option<Expr>),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Lit),
    Ident(String),
    Template(Vec<TemplatePart>),
    Array(Vec<Element>),
    Object(Vec<Prop>),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Element>,
        optional: bool,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Function(Arc<FunctionLit>),
}

impl Expr {
    /// Shorthand for a string literal.
    pub fn str(s: &str) -> Self {
        Self::Lit(Lit::Str(Arc::from(s)))
    }

    /// Shorthand for an identifier.
    pub fn ident(name: &str) -> Self {
        Self::Ident(name.to_string())
    }
}
