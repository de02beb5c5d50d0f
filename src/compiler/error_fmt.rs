//! Rustc-style rendering of template syntax errors with source context.

use std::fmt::Write;

/// A 1-based line and column in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// Computes the location of byte `offset` in `source`.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset);
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let column = source[line_start..offset].chars().count() + 1;
        Self { line, column }
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// A syntax error pointed at a byte offset of its template.
pub struct Diagnostic<'a> {
    pub message: &'a str,
    pub source: &'a str,
    pub offset: usize,
    pub path: &'a str,
    /// Shown after the caret.
    pub annotation: Option<String>,
    pub help: Option<&'a str>,
}

impl<'a> Diagnostic<'a> {
    pub fn new(message: &'a str, source: &'a str, offset: usize) -> Self {
        Self {
            message,
            source,
            offset,
            path: "template",
            annotation: None,
            help: None,
        }
    }

    pub fn path(mut self, path: &'a str) -> Self {
        self.path = path;
        self
    }

    pub fn annotation(mut self, annotation: String) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    /// Renders the diagnostic:
    ///
    /// ```text
    /// error: unclosed block, expected {{endblock}}
    ///  --> /layout:2:3
    ///   |
    /// 2 |   {{block nav}}
    ///   |   ^ in {{block nav}}
    /// help: close the block with {{endblock}}
    /// ```
    ///
    /// The source line is printed as written. Tabs before the caret are
    /// repeated in the gutter so the caret stays aligned.
    pub fn render(&self) -> String {
        let loc = SourceLocation::from_offset(self.source, self.offset);
        let text = self.source.lines().nth(loc.line - 1).unwrap_or_default();
        let gutter = " ".repeat(loc.line.to_string().len());
        let indent: String = text
            .chars()
            .take(loc.column - 1)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "error: {}", self.message);
        let _ = writeln!(out, "{} --> {}:{}:{}", &gutter[1..], self.path, loc.line, loc.column);
        let _ = writeln!(out, "{} |", gutter);
        let _ = writeln!(out, "{} | {}", loc.line, text);
        let _ = write!(out, "{} | {}^", gutter, indent);
        if let Some(annotation) = &self.annotation {
            let _ = write!(out, " {}", annotation);
        }
        out.push('\n');
        if let Some(help) = self.help {
            let _ = writeln!(out, "help: {}", help);
        }
        out
    }
}
