//! Syntax kinds for the directive expression language.
//!
//! Every token the expression lexer can produce. Directive keywords
//! (`if`, `block`, `include`, ...) are recognised on raw directive text
//! before lexing, so they do not appear here.

/// All token kinds in the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // ============================================
    // Atoms
    // ============================================
    /// Identifier (`name`, `$el`, `_private`)
    Ident = 0,
    /// Numeric literal (`36`, `1.5`, `0xff`, `1e3`)
    Number,
    /// Single or double quoted string literal, quotes included
    String,
    /// Backtick template literal, backticks included
    Template,

    // ============================================
    // Punctuation
    // ============================================
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `?.`
    QuestionDot,
    /// `...`
    DotDotDot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `?`
    Question,
    /// `??`
    QuestionQuestion,
    /// `=>`
    FatArrow,
    /// `=`
    Eq,

    // ============================================
    // Operators
    // ============================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    NotEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    AmpersandAmpersand,
    /// `||`
    PipePipe,

    // ============================================
    // Keywords
    // ============================================
    /// `true`
    TrueKw,
    /// `false`
    FalseKw,
    /// `null`
    NullKw,
    /// `undefined`
    UndefinedKw,
    /// `typeof`
    TypeofKw,
    /// `function`
    FunctionKw,
    /// `return`
    ReturnKw,
    /// `const`
    ConstKw,
    /// `let`
    LetKw,
    /// `var`
    VarKw,
    /// `in`
    InKw,
}

impl SyntaxKind {
    /// Returns the keyword kind for an identifier-shaped word, if any.
    pub fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "null" => Self::NullKw,
            "undefined" => Self::UndefinedKw,
            "typeof" => Self::TypeofKw,
            "function" => Self::FunctionKw,
            "return" => Self::ReturnKw,
            "const" => Self::ConstKw,
            "let" => Self::LetKw,
            "var" => Self::VarKw,
            "in" => Self::InKw,
            _ => return None,
        })
    }

    /// Returns true for reserved words.
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::TrueKw as u16)
    }

    /// Returns true if this token can be used as a property name after `.`.
    pub fn is_property_name(self) -> bool {
        self == Self::Ident || self.is_keyword()
    }

    /// Returns true for the declaration keywords accepted in function bodies.
    pub fn is_declaration(self) -> bool {
        matches!(self, Self::ConstKw | Self::LetKw | Self::VarKw)
    }

    /// Returns true if this token can begin an expression.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::String
                | Self::Template
                | Self::LParen
                | Self::LBracket
                | Self::LBrace
                | Self::Plus
                | Self::Minus
                | Self::Bang
                | Self::TrueKw
                | Self::FalseKw
                | Self::NullKw
                | Self::UndefinedKw
                | Self::TypeofKw
                | Self::FunctionKw
        )
    }
}
