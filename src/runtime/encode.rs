//! HTML encoding for `{{:expr}}`.

/// Replaces `& < > " ' /` with numeric character references.
///
/// An `&` that already starts an entity such as `&amp;` is kept.
///
/// ```
/// assert_eq!(beard::encode("a < b && c"), "a &#60; b &#38;&#38; c");
/// assert_eq!(beard::encode("&amp;"), "&amp;");
/// ```
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if starts_entity(&text[i + 1..]) => out.push('&'),
            '&' | '<' | '>' | '"' | '\'' | '/' => {
                out.push_str("&#");
                out.push_str(&u32::from(c).to_string());
                out.push(';');
            }
            _ => out.push(c),
        }
    }
    out
}

/// `\w+;`
fn starts_entity(rest: &str) -> bool {
    let word = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    word > 0 && rest[word..].starts_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_markup() {
        assert_eq!(
            encode("<script>alert(\"hi'\");</script>"),
            "&#60;script&#62;alert(&#34;hi&#39;&#34;);&#60;&#47;script&#62;"
        );
    }

    #[test]
    fn test_keeps_entities() {
        assert_eq!(encode("result&amp;"), "result&amp;");
        assert_eq!(encode("&nbsp; & more"), "&nbsp; &#38; more");
    }

    #[test]
    fn test_bare_ampersand_at_end() {
        assert_eq!(encode("a&"), "a&#38;");
        assert_eq!(encode("&;"), "&#38;;");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(encode("plain text, ünïcode"), "plain text, ünïcode");
    }
}
