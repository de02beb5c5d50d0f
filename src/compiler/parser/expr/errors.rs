//! Error types for the expression parser.

use crate::compiler::lexer::LexError;
use std::fmt;

/// The kind of parse error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Encountered an unexpected token.
    UnexpectedToken,
    /// Reached end of input unexpectedly.
    UnexpectedEof,
    /// Missing closing parenthesis ')'.
    MissingClosingParen,
    /// Missing closing bracket ']'.
    MissingClosingBracket,
    /// Missing closing brace '}'.
    MissingClosingBrace,
    /// Invalid arrow function parameters.
    InvalidArrowParams,
    /// Missing ':' in conditional expression.
    MissingConditionalColon,
    /// Invalid property name in object literal.
    InvalidPropertyName,
    /// Missing property name after '.'.
    MissingPropertyName,
    /// Expected identifier.
    ExpectedIdentifier,
    /// Expected expression.
    ExpectedExpression,
    /// Too many or too few comma separated arguments.
    ArgumentCount,
    /// The token stream could not be produced.
    Lex,
}

impl ParseErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEof => "unexpected end of input",
            Self::MissingClosingParen => "missing closing parenthesis ')'",
            Self::MissingClosingBracket => "missing closing bracket ']'",
            Self::MissingClosingBrace => "missing closing brace '}'",
            Self::InvalidArrowParams => "invalid arrow function parameters",
            Self::MissingConditionalColon => "missing ':' in conditional expression",
            Self::InvalidPropertyName => "invalid property name",
            Self::MissingPropertyName => "missing property name after '.'",
            Self::ExpectedIdentifier => "expected identifier",
            Self::ExpectedExpression => "expected expression",
            Self::ArgumentCount => "wrong number of arguments",
            Self::Lex => "invalid token",
        }
    }
}

/// A parse error with context information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte position in the expression where the error occurred.
    pub position: usize,
    /// What tokens/constructs were expected.
    pub expected: Vec<String>,
    /// What was actually found.
    pub found: Option<String>,
    /// Detail carried over from a lexer error.
    pub detail: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            expected: Vec::new(),
            found: None,
            detail: None,
        }
    }

    /// Creates an "unexpected token" error with the token text.
    pub fn unexpected_token(position: usize, expected: &[&str], found: &str) -> Self {
        Self::new(ParseErrorKind::UnexpectedToken, position)
            .with_expected(expected)
            .with_found(&format!("'{}'", found))
    }

    /// Creates an "unexpected EOF" error.
    pub fn unexpected_eof(position: usize, expected: &[&str]) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, position).with_expected(expected)
    }

    /// Creates a "missing closing" error for the given delimiter.
    pub fn missing_closing(kind: ParseErrorKind, position: usize) -> Self {
        let delimiter = match kind {
            ParseErrorKind::MissingClosingParen => "')'",
            ParseErrorKind::MissingClosingBracket => "']'",
            ParseErrorKind::MissingClosingBrace => "'}'",
            _ => "delimiter",
        };
        Self::new(kind, position).with_expected(&[delimiter])
    }

    /// Adds expected tokens to the error.
    pub fn with_expected(mut self, expected: &[&str]) -> Self {
        self.expected = expected.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Adds the found token to the error.
    pub fn with_found(mut self, found: &str) -> Self {
        self.found = Some(found.to_string());
        self
    }

    /// Shifts the position by `offset`.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }

    /// Converts the error to a user-friendly message without position.
    pub fn to_message(&self) -> String {
        if let Some(detail) = &self.detail {
            return detail.clone();
        }

        let mut msg = self.kind.description().to_string();

        if let Some(ref found) = self.found {
            msg.push_str(&format!(", found {}", found));
        }

        if !self.expected.is_empty() {
            if self.expected.len() == 1 {
                msg.push_str(&format!(", expected {}", self.expected[0]));
            } else {
                msg.push_str(&format!(", expected one of: {}", self.expected.join(", ")));
            }
        }

        msg
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Lex,
            position: err.position,
            expected: Vec::new(),
            found: err.found.clone(),
            detail: Some(err.to_string()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_message())
    }
}

impl std::error::Error for ParseError {}

/// Result type for expression parsing.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::LexErrorKind;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::unexpected_token(3, &["expression"], "}");
        assert_eq!(err.to_message(), "unexpected token, found '}', expected expression");
    }

    #[test]
    fn test_multiple_expected() {
        let err = ParseError::unexpected_eof(9, &["','", "')'"]);
        assert_eq!(
            err.to_message(),
            "unexpected end of input, expected one of: ',', ')'"
        );
    }

    #[test]
    fn test_missing_closing() {
        let err = ParseError::missing_closing(ParseErrorKind::MissingClosingBracket, 4);
        assert_eq!(err.expected, vec!["']'".to_string()]);
    }

    #[test]
    fn test_lex_errors_keep_their_message() {
        let lex = LexError::new(LexErrorKind::UnterminatedString, 5);
        let err = ParseError::from(lex);
        assert_eq!(err.kind, ParseErrorKind::Lex);
        assert_eq!(err.position, 5);
        assert_eq!(err.to_message(), "unterminated string literal");
    }
}
