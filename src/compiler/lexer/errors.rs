//! Error types for the expression lexer.

use std::fmt;

/// The kind of lexer error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Unterminated string literal - missing closing quote.
    UnterminatedString,
    /// Unterminated template literal - missing closing backtick.
    UnterminatedTemplateLiteral,
    /// Unterminated `${...}` substitution inside a template literal.
    UnterminatedSubstitution,
    /// Invalid escape sequence in string.
    InvalidEscapeSequence,
    /// Invalid character in input.
    InvalidCharacter,
    /// Malformed numeric literal.
    InvalidNumber,
}

impl LexErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnterminatedString => "unterminated string literal",
            Self::UnterminatedTemplateLiteral => "unterminated template literal",
            Self::UnterminatedSubstitution => "unterminated template substitution",
            Self::InvalidEscapeSequence => "invalid escape sequence",
            Self::InvalidCharacter => "invalid character",
            Self::InvalidNumber => "invalid numeric literal",
        }
    }

    /// Returns a suggested fix for this error kind.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnterminatedString => Some("add a closing quote \" or '"),
            Self::UnterminatedTemplateLiteral => Some("add a closing backtick `"),
            Self::UnterminatedSubstitution => Some("add a closing brace } to ${...}"),
            Self::InvalidEscapeSequence => {
                Some("use a valid escape: \\n, \\t, \\r, \\\\, \\', \\\", \\xHH or \\uHHHH")
            }
            _ => None,
        }
    }
}

/// A lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// The kind of error.
    pub kind: LexErrorKind,
    /// Byte position in the expression where the error occurred.
    pub position: usize,
    /// What was actually found.
    pub found: Option<String>,
    /// Position where the construct was opened (for unterminated errors).
    pub opened_at: Option<usize>,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(kind: LexErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            found: None,
            opened_at: None,
        }
    }

    /// Creates an "unterminated string" error.
    pub fn unterminated_string(position: usize, opened_at: usize) -> Self {
        Self::new(LexErrorKind::UnterminatedString, position).opened_at(opened_at)
    }

    /// Creates an "unterminated template literal" error.
    pub fn unterminated_template(position: usize, opened_at: usize) -> Self {
        Self::new(LexErrorKind::UnterminatedTemplateLiteral, position).opened_at(opened_at)
    }

    /// Creates an "invalid character" error.
    pub fn invalid_character(position: usize, c: char) -> Self {
        Self::new(LexErrorKind::InvalidCharacter, position).with_found(&format!("'{}'", c))
    }

    /// Creates an "invalid escape sequence" error.
    pub fn invalid_escape(position: usize, sequence: &str) -> Self {
        Self::new(LexErrorKind::InvalidEscapeSequence, position)
            .with_found(&format!("\\{}", sequence))
    }

    /// Adds the found token to the error.
    pub fn with_found(mut self, found: &str) -> Self {
        self.found = Some(found.to_string());
        self
    }

    /// Sets the position where the construct was opened.
    pub fn opened_at(mut self, pos: usize) -> Self {
        self.opened_at = Some(pos);
        self
    }

    /// Shifts every position by `offset`, used when lexing a substitution
    /// that was cut out of a larger expression.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        self.opened_at = self.opened_at.map(|p| p + offset);
        self
    }

    /// Short description without position information.
    pub fn reason(&self) -> String {
        match &self.found {
            Some(found) => format!("{}, found {}", self.kind.description(), found),
            None => self.kind.description().to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())?;
        if let Some(opened) = self.opened_at {
            write!(f, " (opened at position {})", opened)?;
        }
        Ok(())
    }
}

impl std::error::Error for LexError {}

/// Result type for lexing.
pub type LexResult<T> = Result<T, LexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_string_message() {
        let err = LexError::unterminated_string(7, 0);
        assert_eq!(err.to_string(), "unterminated string literal (opened at position 0)");
    }

    #[test]
    fn test_invalid_character_reason() {
        let err = LexError::invalid_character(3, '#');
        assert_eq!(err.reason(), "invalid character, found '#'");
    }

    #[test]
    fn test_shifted_moves_both_positions() {
        let err = LexError::unterminated_template(4, 1).shifted(10);
        assert_eq!(err.position, 14);
        assert_eq!(err.opened_at, Some(11));
    }

    #[test]
    fn test_all_error_kinds_have_descriptions() {
        let kinds = [
            LexErrorKind::UnterminatedString,
            LexErrorKind::UnterminatedTemplateLiteral,
            LexErrorKind::UnterminatedSubstitution,
            LexErrorKind::InvalidEscapeSequence,
            LexErrorKind::InvalidCharacter,
            LexErrorKind::InvalidNumber,
        ];
        for kind in kinds {
            assert!(!kind.description().is_empty(), "{:?} has empty description", kind);
        }
    }
}
