use super::literals::{TemplateChunk, parse_number, split_template, unescape_string};
use super::*;

fn lex(input: &str) -> Vec<(SyntaxKind, String)> {
    Lexer::new(input)
        .tokenize()
        .expect("input should lex")
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

fn kinds(input: &str) -> Vec<SyntaxKind> {
    lex(input).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_identifier_and_member() {
    assert_eq!(
        kinds("math.add"),
        vec![SyntaxKind::Ident, SyntaxKind::Dot, SyntaxKind::Ident]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("typeof null in undefined"),
        vec![
            SyntaxKind::TypeofKw,
            SyntaxKind::NullKw,
            SyntaxKind::InKw,
            SyntaxKind::UndefinedKw
        ]
    );
}

#[test]
fn test_longest_punctuation_wins() {
    assert_eq!(
        kinds("a === b !== c == d"),
        vec![
            SyntaxKind::Ident,
            SyntaxKind::EqEqEq,
            SyntaxKind::Ident,
            SyntaxKind::NotEqEq,
            SyntaxKind::Ident,
            SyntaxKind::EqEq,
            SyntaxKind::Ident
        ]
    );
}

#[test]
fn test_arrow_and_spread() {
    assert_eq!(
        kinds("(...xs) => xs"),
        vec![
            SyntaxKind::LParen,
            SyntaxKind::DotDotDot,
            SyntaxKind::Ident,
            SyntaxKind::RParen,
            SyntaxKind::FatArrow,
            SyntaxKind::Ident
        ]
    );
}

#[test]
fn test_optional_chain_versus_conditional() {
    assert_eq!(
        kinds("a?.b"),
        vec![SyntaxKind::Ident, SyntaxKind::QuestionDot, SyntaxKind::Ident]
    );
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            SyntaxKind::Ident,
            SyntaxKind::Question,
            SyntaxKind::Number,
            SyntaxKind::Colon,
            SyntaxKind::Number
        ]
    );
}

#[test]
fn test_strings_keep_quotes() {
    let tokens = lex(r#"'it\'s' "two""#);
    assert_eq!(tokens[0], (SyntaxKind::String, r"'it\'s'".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::String, "\"two\"".to_string()));
}

#[test]
fn test_template_with_nested_braces() {
    let tokens = lex("`a ${ {x: 1}.x } b` + 1");
    assert_eq!(tokens[0].0, SyntaxKind::Template);
    assert_eq!(tokens[0].1, "`a ${ {x: 1}.x } b`");
    assert_eq!(tokens[1].0, SyntaxKind::Plus);
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("36 1.5 .5 1e3 0xff"),
        vec![SyntaxKind::Number; 5]
    );
    assert_eq!(parse_number("0xff"), Some(255.0));
    assert_eq!(parse_number("1e3"), Some(1000.0));
    assert_eq!(parse_number(".5"), Some(0.5));
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a /* note */ + // tail\n b"),
        vec![SyntaxKind::Ident, SyntaxKind::Plus, SyntaxKind::Ident]
    );
}

#[test]
fn test_multiline_input() {
    let tokens = lex("{\n  title: 'multi',\n  item: 'line'\n}");
    assert_eq!(tokens.first().map(|t| t.0), Some(SyntaxKind::LBrace));
    assert_eq!(tokens.last().map(|t| t.0), Some(SyntaxKind::RBrace));
    assert_eq!(tokens.len(), 9);
}

#[test]
fn test_unterminated_string() {
    let err = Lexer::new("'abc").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.opened_at, Some(0));
}

#[test]
fn test_unterminated_template() {
    let err = Lexer::new("`abc ${x}").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedTemplateLiteral);
}

#[test]
fn test_invalid_character() {
    let err = Lexer::new("a # b").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidCharacter);
    assert_eq!(err.position, 2);
}

#[test]
fn test_identifier_followed_by_number_is_rejected() {
    let err = Lexer::new("3px").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidNumber);
}

#[test]
fn test_unescape_string() {
    assert_eq!(unescape_string(r"'a\nb'", 0).unwrap(), "a\nb");
    assert_eq!(unescape_string(r"'\x41B\u{43}'", 0).unwrap(), "ABC");
    assert_eq!(unescape_string(r"'hi\''", 0).unwrap(), "hi'");
}

#[test]
fn test_unescape_invalid_hex() {
    let err = unescape_string(r"'\xZZ'", 0).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidEscapeSequence);
}

#[test]
fn test_split_template() {
    let chunks = split_template("`/components/${name}!`", 10).unwrap();
    assert_eq!(
        chunks,
        vec![
            TemplateChunk::Text("/components/".to_string()),
            TemplateChunk::Substitution {
                source: "name".to_string(),
                start: 25,
            },
            TemplateChunk::Text("!".to_string()),
        ]
    );
}

#[test]
fn test_split_template_escaped_substitution() {
    let chunks = split_template(r"`\${x}`", 0).unwrap();
    assert_eq!(chunks, vec![TemplateChunk::Text("${x}".to_string())]);
}

#[test]
fn test_is_identifier() {
    assert!(is_identifier("nav"));
    assert!(is_identifier("$el_2"));
    assert!(!is_identifier("2nav"));
    assert!(!is_identifier("a.b"));
    assert!(!is_identifier("return"));
    assert!(!is_identifier(""));
}
