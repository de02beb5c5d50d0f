//! Lexer for directive expressions.
//!
//! Turns the text of an expression (`names.map((n) => n.toUpperCase())`,
//! `'partial', {title: 'x'}`) into a flat token stream. Whitespace and
//! comments are dropped. String and template literals are kept raw and
//! decoded later by the parser, see [`literals`].

mod errors;
pub(crate) mod literals;
#[cfg(test)]
mod tests;

pub use errors::{LexError, LexErrorKind, LexResult};

use super::syntax::SyntaxKind;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The raw text of the token.
    pub text: String,
    /// The byte offset where this token starts.
    pub start: usize,
}

/// Punctuation, longest first so `===` wins over `==` and `=`.
const PUNCTUATION: &[(&str, SyntaxKind)] = &[
    ("===", SyntaxKind::EqEqEq),
    ("!==", SyntaxKind::NotEqEq),
    ("...", SyntaxKind::DotDotDot),
    ("**", SyntaxKind::StarStar),
    ("==", SyntaxKind::EqEq),
    ("!=", SyntaxKind::NotEq),
    ("<=", SyntaxKind::LtEq),
    (">=", SyntaxKind::GtEq),
    ("&&", SyntaxKind::AmpersandAmpersand),
    ("||", SyntaxKind::PipePipe),
    ("??", SyntaxKind::QuestionQuestion),
    ("?.", SyntaxKind::QuestionDot),
    ("=>", SyntaxKind::FatArrow),
    ("(", SyntaxKind::LParen),
    (")", SyntaxKind::RParen),
    ("[", SyntaxKind::LBracket),
    ("]", SyntaxKind::RBracket),
    ("{", SyntaxKind::LBrace),
    ("}", SyntaxKind::RBrace),
    (",", SyntaxKind::Comma),
    (".", SyntaxKind::Dot),
    (":", SyntaxKind::Colon),
    (";", SyntaxKind::Semicolon),
    ("?", SyntaxKind::Question),
    ("=", SyntaxKind::Eq),
    ("+", SyntaxKind::Plus),
    ("-", SyntaxKind::Minus),
    ("*", SyntaxKind::Star),
    ("/", SyntaxKind::Slash),
    ("%", SyntaxKind::Percent),
    ("!", SyntaxKind::Bang),
    ("<", SyntaxKind::Lt),
    (">", SyntaxKind::Gt),
];

/// The lexer for expression input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole input.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.input.len() {
                return Ok(tokens);
            }
            let start = self.pos;
            let kind = self.next_kind()?;
            tokens.push(Token {
                kind,
                text: self.input[start..self.pos].to_string(),
                start,
            });
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.input.len());
    }

    /// Skips whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.remaining();
            let trimmed = rest.trim_start();
            self.advance(rest.len() - trimmed.len());

            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.advance(end);
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.advance(end + 4),
                    None => self.advance(trimmed.len()),
                }
            } else {
                return;
            }
        }
    }

    fn next_kind(&mut self) -> LexResult<SyntaxKind> {
        let Some(c) = self.peek() else {
            return Err(LexError::new(LexErrorKind::InvalidCharacter, self.pos));
        };

        match c {
            '"' | '\'' => self.lex_string(c),
            '`' => self.lex_template(),
            '0'..='9' => self.lex_number(),
            '.' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => self.lex_number(),
            c if is_ident_start(c) => Ok(self.lex_word()),
            _ => self.lex_punctuation(c),
        }
    }

    fn lex_word(&mut self) -> SyntaxKind {
        let rest = self.remaining();
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_continue(*c))
            .map_or(rest.len(), |(i, _)| i);
        let word = &rest[..len];
        self.advance(len);
        SyntaxKind::keyword(word).unwrap_or(SyntaxKind::Ident)
    }

    fn lex_punctuation(&mut self, c: char) -> LexResult<SyntaxKind> {
        let rest = self.remaining();
        for (text, kind) in PUNCTUATION {
            if !rest.starts_with(text) {
                continue;
            }
            // `a?.5:1` is a conditional, not an optional chain
            if *kind == SyntaxKind::QuestionDot
                && rest[2..].starts_with(|n: char| n.is_ascii_digit())
            {
                continue;
            }
            self.advance(text.len());
            return Ok(*kind);
        }
        Err(LexError::invalid_character(self.pos, c))
    }
}

/// Returns true if `c` can start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

/// Returns true if `c` can continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

/// Returns true if `text` is a single identifier that is not a reserved word.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_ident_start)
        && chars.all(is_ident_continue)
        && SyntaxKind::keyword(text).is_none()
}
