//! String, template and number literals.
//!
//! The lexer only finds literal boundaries. Decoding escapes and splitting
//! template literals into text and `${...}` substitutions happens here on
//! demand, when the parser builds the literal node.

use super::errors::{LexError, LexErrorKind, LexResult};
use super::{Lexer, SyntaxKind};

/// A piece of a template literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateChunk {
    /// Literal text with escapes already decoded.
    Text(String),
    /// The source of a `${...}` substitution and its absolute start offset.
    Substitution { source: String, start: usize },
}

impl Lexer<'_> {
    /// Lexes a quoted string, leaving the quotes in the token text.
    pub(super) fn lex_string(&mut self, quote: char) -> LexResult<SyntaxKind> {
        let opened_at = self.pos;
        match scan_quoted(self.input, self.pos + 1, quote) {
            Some(close) => {
                self.pos = close + 1;
                Ok(SyntaxKind::String)
            }
            None => Err(LexError::unterminated_string(self.input.len(), opened_at)),
        }
    }

    /// Lexes a template literal, including nested substitutions.
    pub(super) fn lex_template(&mut self) -> LexResult<SyntaxKind> {
        let opened_at = self.pos;
        match scan_template(self.input, self.pos + 1) {
            Some(close) => {
                self.pos = close + 1;
                Ok(SyntaxKind::Template)
            }
            None => Err(LexError::unterminated_template(self.input.len(), opened_at)),
        }
    }

    /// Lexes a decimal or hexadecimal number.
    pub(super) fn lex_number(&mut self) -> LexResult<SyntaxKind> {
        let start = self.pos;
        let rest = self.remaining();

        if rest.starts_with("0x") || rest.starts_with("0X") {
            let digits = rest[2..]
                .find(|c: char| !c.is_ascii_hexdigit())
                .unwrap_or(rest.len() - 2);
            if digits == 0 {
                return Err(LexError::new(LexErrorKind::InvalidNumber, start));
            }
            self.advance(2 + digits);
        } else {
            let bytes = rest.as_bytes();
            let mut len = 0;
            let mut seen_dot = false;
            let mut seen_exp = false;
            while len < bytes.len() {
                match bytes[len] {
                    b'0'..=b'9' => len += 1,
                    b'.' if !seen_dot && !seen_exp => {
                        seen_dot = true;
                        len += 1;
                    }
                    b'e' | b'E' if !seen_exp => {
                        seen_exp = true;
                        len += 1;
                        if matches!(bytes.get(len), Some(b'+' | b'-')) {
                            len += 1;
                        }
                        if !bytes.get(len).is_some_and(u8::is_ascii_digit) {
                            return Err(LexError::new(LexErrorKind::InvalidNumber, start));
                        }
                    }
                    _ => break,
                }
            }
            self.advance(len);
        }

        if let Some(c) = self.peek().filter(|c| super::is_ident_start(*c)) {
            return Err(LexError::new(LexErrorKind::InvalidNumber, start)
                .with_found(&format!("{}{}", &self.input[start..self.pos], c)));
        }
        Ok(SyntaxKind::Number)
    }
}

/// Parses the text of a number token.
pub fn parse_number(text: &str) -> Option<f64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    text.parse().ok()
}

/// Returns the byte index of the closing `quote`, scanning from `from`.
fn scan_quoted(s: &str, from: usize, quote: char) -> Option<usize> {
    let mut chars = s[from..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            c if c == quote => return Some(from + i),
            _ => {}
        }
    }
    None
}

/// Returns the byte index of the closing backtick, scanning from `from`
/// (just past the opening backtick).
fn scan_template(s: &str, from: usize) -> Option<usize> {
    let mut i = from;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with('\\') {
            i += 1 + rest[1..].chars().next().map_or(0, char::len_utf8);
        } else if rest.starts_with('`') {
            return Some(i);
        } else if rest.starts_with("${") {
            i = scan_substitution(s, i + 2)? + 1;
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Returns the byte index of the `}` closing a substitution whose body
/// starts at `from`.
fn scan_substitution(s: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = from;
    while i < s.len() {
        let c = s[i..].chars().next()?;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            '"' | '\'' => i = scan_quoted(s, i + 1, c)?,
            '`' => i = scan_template(s, i + 1)?,
            _ => {}
        }
        i += c.len_utf8();
    }
    None
}

/// Decodes a quoted string token (quotes included) into its value.
pub fn unescape_string(raw: &str, start: usize) -> LexResult<String> {
    let inner = raw
        .get(1..raw.len().saturating_sub(1))
        .ok_or_else(|| LexError::unterminated_string(start + raw.len(), start))?;
    unescape(inner, start + 1)
}

/// Splits a template literal token (backticks included) into chunks.
pub fn split_template(raw: &str, start: usize) -> LexResult<Vec<TemplateChunk>> {
    let body_end = raw.len().saturating_sub(1);
    let mut chunks = Vec::new();
    let mut text_start = 1;
    let mut i = 1;

    while i < body_end {
        let rest = &raw[i..];
        if rest.starts_with('\\') {
            i += 1 + rest[1..].chars().next().map_or(0, char::len_utf8);
        } else if rest.starts_with("${") {
            if i > text_start {
                chunks.push(TemplateChunk::Text(unescape(
                    &raw[text_start..i],
                    start + text_start,
                )?));
            }
            let close = scan_substitution(raw, i + 2).ok_or_else(|| {
                LexError::new(LexErrorKind::UnterminatedSubstitution, start + body_end)
                    .opened_at(start + i)
            })?;
            chunks.push(TemplateChunk::Substitution {
                source: raw[i + 2..close].to_string(),
                start: start + i + 2,
            });
            i = close + 1;
            text_start = i;
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    if body_end > text_start {
        chunks.push(TemplateChunk::Text(unescape(
            &raw[text_start..body_end],
            start + text_start,
        )?));
    }
    Ok(chunks)
}

/// Decodes escape sequences. `offset` is the absolute position of `s`.
fn unescape(s: &str, offset: usize) -> LexResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            return Err(LexError::invalid_escape(offset + i, ""));
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next().map(|(_, h)| h)).collect();
                out.push(decode_code_point(&hex).ok_or_else(|| {
                    LexError::invalid_escape(offset + i, &format!("x{}", hex))
                })?);
            }
            'u' => {
                let hex: String = if chars.peek().is_some_and(|(_, c)| *c == '{') {
                    chars.next();
                    chars
                        .by_ref()
                        .map(|(_, h)| h)
                        .take_while(|h| *h != '}')
                        .collect()
                } else {
                    (0..4).filter_map(|_| chars.next().map(|(_, h)| h)).collect()
                };
                out.push(decode_code_point(&hex).ok_or_else(|| {
                    LexError::invalid_escape(offset + i, &format!("u{}", hex))
                })?);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn decode_code_point(hex: &str) -> Option<char> {
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
