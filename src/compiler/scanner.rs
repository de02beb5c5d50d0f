//! Splits template source into literal text and `{{ ... }}` directives.
//!
//! A directive opens at `{{` and closes at the first `}}` that is not
//! followed by another `}`, so `{{foo}}}` carries the text `foo}`. The
//! content must hold at least one character. An `{{` with no closing
//! `}}` after it is literal text.
//!
//! `extends` directives are pulled out of the sequence. Only the last one
//! is kept and it is placed after every other segment.

/// A directive found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive content with surrounding whitespace removed.
    pub text: String,
    /// 1-based line of the opening `{{`.
    pub line: usize,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

/// A piece of scanned source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text {
        text: String,
        line: usize,
        offset: usize,
    },
    Directive(Directive),
}

/// Scans `source` into segments.
pub fn scan(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut extends = None;
    let mut cursor = 0;
    let mut line = 1;

    while let Some(relative) = source[cursor..].find("{{") {
        let open = cursor + relative;
        let content_start = open + 2;
        let Some(close) = find_close(source, content_start) else {
            break;
        };

        if open > cursor {
            segments.push(Segment::Text {
                text: source[cursor..open].to_string(),
                line,
                offset: cursor,
            });
            line += count_newlines(&source[cursor..open]);
        }

        let raw = &source[content_start..close];
        let text = raw.trim();
        let directive = Directive {
            text: text.to_string(),
            line,
            offset: content_start + (raw.len() - raw.trim_start().len()),
        };
        line += count_newlines(&source[open..close]);

        if is_extends(text) {
            extends = Some(directive);
        } else {
            segments.push(Segment::Directive(directive));
        }
        cursor = close + 2;
    }

    if cursor < source.len() {
        segments.push(Segment::Text {
            text: source[cursor..].to_string(),
            line,
            offset: cursor,
        });
    }
    if let Some(directive) = extends {
        segments.push(Segment::Directive(directive));
    }

    segments
}

/// Finds the `}}` closing a directive whose content starts at `from`.
fn find_close(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from + 1;
    while i + 1 < bytes.len() {
        if bytes[i] == b'}' && bytes[i + 1] == b'}' && bytes.get(i + 2) != Some(&b'}') {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

/// Returns true if the directive text is an `extends` directive.
pub fn is_extends(text: &str) -> bool {
    text.strip_prefix("extends")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(text: &str, line: usize, offset: usize) -> Segment {
        Segment::Directive(Directive {
            text: text.to_string(),
            line,
            offset,
        })
    }

    fn text(text: &str, line: usize, offset: usize) -> Segment {
        Segment::Text {
            text: text.to_string(),
            line,
            offset,
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(scan("no directives"), vec![text("no directives", 1, 0)]);
    }

    #[test]
    fn test_directive_is_trimmed() {
        assert_eq!(
            scan("a {{  name  }} b"),
            vec![text("a ", 1, 0), directive("name", 1, 6), text(" b", 1, 14)]
        );
    }

    #[test]
    fn test_extra_closing_brace_belongs_to_directive() {
        assert_eq!(scan("{{foo}}}"), vec![directive("foo}", 1, 2)]);
    }

    #[test]
    fn test_object_literal_closing_braces() {
        let segments = scan("{{@header {title: 'x'}}}");
        assert_eq!(segments, vec![directive("@header {title: 'x'}", 1, 2)]);
    }

    #[test]
    fn test_empty_braces_are_text() {
        assert_eq!(scan("{{}}"), vec![text("{{}}", 1, 0)]);
    }

    #[test]
    fn test_unclosed_open_is_text() {
        assert_eq!(
            scan("{{a}} and {{ never"),
            vec![directive("a", 1, 2), text(" and {{ never", 1, 5)]
        );
    }

    #[test]
    fn test_line_numbers() {
        let segments = scan("one\ntwo {{a}}\n{{b\n}}\n{{c}}");
        let lines: Vec<(String, usize)> = segments
            .into_iter()
            .filter_map(|s| match s {
                Segment::Directive(d) => Some((d.text, d.line)),
                Segment::Text { .. } => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 3),
                ("c".to_string(), 5)
            ]
        );
    }

    #[test]
    fn test_last_extends_is_moved_to_end() {
        let segments = scan("{{extends 'a'}}x{{extends 'b'}}y");
        assert_eq!(
            segments,
            vec![
                text("x", 1, 15),
                text("y", 1, 31),
                directive("extends 'b'", 1, 18),
            ]
        );
    }

    #[test]
    fn test_multiline_directive() {
        let segments = scan("{{include 'item', {\n  title: 'multi'\n}}}");
        assert_eq!(
            segments,
            vec![directive("include 'item', {\n  title: 'multi'\n}", 1, 2)]
        );
    }

    #[test]
    fn test_is_extends() {
        assert!(is_extends("extends 'layout'"));
        assert!(is_extends("extends\n`${x}`"));
        assert!(!is_extends("extendsLayout"));
        assert!(!is_extends("extends"));
    }
}
