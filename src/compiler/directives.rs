//! Directive recognition.
//!
//! Each directive's trimmed text is matched against the directive forms in
//! a fixed order and the first match wins. Text matching no form is an
//! expression to evaluate and emit.

use super::ast::Expr;
use super::errors::{DirectiveError, SyntaxErrorKind};
use super::grammar::Grammar;
use super::ir::{Condition, Instruction, Loop, LoopKind, UNPATCHED};
use super::lexer::is_identifier;
use super::parser::Parser;

type DirectiveResult<T> = Result<T, DirectiveError>;

/// Compiles the trimmed text of one directive into an instruction.
pub(crate) fn compile_directive(text: &str, grammar: &Grammar) -> DirectiveResult<Instruction> {
    if text.is_empty() {
        return Err(DirectiveError::new(
            SyntaxErrorKind::EmptyDirective,
            "directive is empty",
            0,
        ));
    }

    if let Some(rest) = keyword(text, "extends") {
        return Ok(Instruction::Extends(expression(text, rest)?));
    }

    if let Some(rest) = keyword(text, "include:content") {
        let (path, data) = path_and_data(text, rest)?;
        return Ok(Instruction::Include {
            path,
            data,
            content: true,
        });
    }
    if let Some(rest) = keyword(text, "include") {
        let (path, data) = path_and_data(text, rest)?;
        return Ok(Instruction::Include {
            path,
            data,
            content: false,
        });
    }
    if text == "endinclude" {
        return Ok(Instruction::IncludeEnd);
    }

    if let Some(rest) = keyword(text, "block") {
        return Ok(Instruction::BlockOpen(name(text, rest, "block")?));
    }
    if text == "endblock" {
        return Ok(Instruction::BlockClose);
    }

    if let Some(rest) = keyword(text, "put") {
        return Ok(Instruction::Put(name(text, rest, "put")?));
    }
    if let Some(rest) = keyword(text, "exists") {
        return Ok(Instruction::If {
            test: Condition::Exists(name(text, rest, "exists")?),
            alt: UNPATCHED,
        });
    }
    if let Some(rest) = keyword(text, "existsNot") {
        return Ok(Instruction::If {
            test: Condition::NotExists(name(text, rest, "existsNot")?),
            alt: UNPATCHED,
        });
    }

    if let Some(rest) = text.strip_prefix(':') {
        return Ok(Instruction::Encode(expression(text, rest.trim_start())?));
    }

    if text.len() >= 2 && text.starts_with('*') && text.ends_with('*') {
        return Ok(Instruction::Comment);
    }

    if let Some(rest) = keyword(text, "else").and_then(|rest| keyword(rest, "if")) {
        return Ok(Instruction::ElseIf {
            test: expression(text, rest)?,
            alt: UNPATCHED,
            end: UNPATCHED,
        });
    }
    if text == "else" {
        return Ok(Instruction::Else { end: UNPATCHED });
    }
    if let Some(rest) = keyword(text, "if") {
        return Ok(Instruction::If {
            test: Condition::Truthy(expression(text, rest)?),
            alt: UNPATCHED,
        });
    }

    if let Some(rest) = keyword(text, "for") {
        return loop_header(text, rest, LoopKind::For);
    }
    if let Some(rest) = keyword(text, "each") {
        return loop_header(text, rest, LoopKind::Each);
    }
    if text == "end" {
        return Ok(Instruction::End);
    }

    if let Some(instruction) = tag(text, grammar)? {
        return Ok(instruction);
    }
    if let Some(instruction) = shortcut(text, grammar)? {
        return Ok(instruction);
    }

    Ok(Instruction::Eval(expression(text, text)?))
}

/// Matches `word` followed by whitespace and returns the rest, left-trimmed.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Byte offset of `inner` within `outer`. `inner` must be a subslice.
fn offset_of(outer: &str, inner: &str) -> usize {
    (inner.as_ptr() as usize).saturating_sub(outer.as_ptr() as usize)
}

fn expression(text: &str, source: &str) -> DirectiveResult<Expr> {
    Parser::parse_expression(source).map_err(|err| DirectiveError::parse(err, offset_of(text, source)))
}

fn arguments(text: &str, source: &str, max: usize) -> DirectiveResult<Vec<Expr>> {
    Parser::parse_arguments(source, max)
        .map_err(|err| DirectiveError::parse(err, offset_of(text, source)))
}

fn path_and_data(text: &str, source: &str) -> DirectiveResult<(Expr, Option<Expr>)> {
    let mut args = arguments(text, source, 2)?.into_iter();
    match args.next() {
        Some(first) => Ok((first, args.next())),
        None => Err(DirectiveError::new(
            SyntaxErrorKind::InvalidExpression,
            "expected an argument",
            offset_of(text, source),
        )),
    }
}

fn optional_data(text: &str, source: &str) -> DirectiveResult<Option<Expr>> {
    if source.is_empty() {
        return Ok(None);
    }
    Ok(arguments(text, source, 1)?.into_iter().next())
}

fn name(text: &str, source: &str, directive: &str) -> DirectiveResult<String> {
    let candidate = source.trim_end();
    if is_identifier(candidate) {
        return Ok(candidate.to_string());
    }
    Err(DirectiveError::new(
        SyntaxErrorKind::InvalidName,
        format!("`{}` is not a valid {} name", candidate, directive),
        offset_of(text, source),
    ))
}

/// Parses `value[, key] in source` after `for` or `each`.
fn loop_header(text: &str, rest: &str, kind: LoopKind) -> DirectiveResult<Instruction> {
    let keyword = match kind {
        LoopKind::For => "for",
        LoopKind::Each => "each",
    };
    let invalid = || {
        DirectiveError::new(
            SyntaxErrorKind::InvalidLoop,
            format!("expected `{} value[, key] in expression`", keyword),
            offset_of(text, rest),
        )
    };

    let (bindings, source) = split_in(rest).ok_or_else(invalid)?;
    let mut names = bindings.split(',').map(str::trim);
    let value = names.next().filter(|n| is_identifier(n)).ok_or_else(invalid)?;
    let key = match names.next() {
        Some(key) if is_identifier(key) => Some(key.to_string()),
        Some(_) => return Err(invalid()),
        None => None,
    };
    if names.next().is_some() {
        return Err(invalid());
    }

    Ok(Instruction::Loop(Loop {
        kind,
        value: value.to_string(),
        key,
        source: expression(text, source)?,
        end: UNPATCHED,
    }))
}

/// Splits at the first ` in ` surrounded by whitespace.
fn split_in(rest: &str) -> Option<(&str, &str)> {
    rest.char_indices().find_map(|(i, c)| {
        if !c.is_whitespace() {
            return None;
        }
        let after = &rest[i + c.len_utf8()..];
        let tail = after.strip_prefix("in")?;
        if !tail.starts_with(char::is_whitespace) {
            return None;
        }
        let source = tail.trim_start();
        (!source.is_empty()).then(|| (rest[..i].trim_end(), source))
    })
}

fn tag(text: &str, grammar: &Grammar) -> DirectiveResult<Option<Instruction>> {
    for form in grammar.tags() {
        let name = form.name.as_str();
        let with_content = text
            .strip_prefix(name)
            .and_then(|rest| keyword(rest, ":content"));

        if let Some(rest) = with_content {
            if !form.content {
                return Err(DirectiveError::new(
                    SyntaxErrorKind::ContentNotAccepted,
                    format!("tag `{}` does not accept content", name),
                    0,
                ));
            }
            let (first_arg, data) = path_and_data(text, rest)?;
            return Ok(Some(Instruction::Tag {
                name: name.to_string(),
                first_arg,
                data,
                content: true,
            }));
        }

        if let Some(rest) = keyword(text, name) {
            let (first_arg, data) = path_and_data(text, rest)?;
            return Ok(Some(Instruction::Tag {
                name: name.to_string(),
                first_arg,
                data,
                content: false,
            }));
        }

        if form.content && text.strip_prefix("end") == Some(name) {
            return Ok(Some(Instruction::TagEnd(name.to_string())));
        }
    }
    Ok(None)
}

fn shortcut(text: &str, grammar: &Grammar) -> DirectiveResult<Option<Instruction>> {
    if let Some(body) = text.strip_prefix('@') {
        for form in grammar.shortcuts() {
            let alias = form.alias.as_str();
            let Some(after) = body.strip_prefix(alias) else {
                continue;
            };

            if let Some(after_content) = after.strip_prefix(":content") {
                if !after_content.is_empty() && !after_content.starts_with(char::is_whitespace) {
                    continue;
                }
                if !form.content {
                    return Err(DirectiveError::new(
                        SyntaxErrorKind::ContentNotAccepted,
                        format!("shortcut `@{}` does not accept content", alias),
                        0,
                    ));
                }
                return Ok(Some(Instruction::Shortcut {
                    name: alias.to_string(),
                    data: optional_data(text, after_content.trim_start())?,
                    content: true,
                }));
            }

            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return Ok(Some(Instruction::Shortcut {
                    name: alias.to_string(),
                    data: optional_data(text, after.trim_start())?,
                    content: false,
                }));
            }
        }
        return Ok(None);
    }

    if let Some(alias) = text.strip_prefix("end") {
        let closes = grammar
            .shortcuts()
            .iter()
            .any(|form| form.content && form.alias == alias);
        if closes {
            return Ok(Some(Instruction::ShortcutEnd(alias.to_string())));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{Lit, Prop, PropKey};

    fn grammar() -> Grammar {
        Grammar::new()
            .tag("tag", true)
            .tag("asset", false)
            .shortcut("logo", false)
            .shortcut("header", true)
            .shortcut("page.info", true)
    }

    fn compile(text: &str) -> Instruction {
        compile_directive(text, &grammar()).expect("directive should compile")
    }

    fn fail(text: &str) -> DirectiveError {
        compile_directive(text, &grammar()).expect_err("directive should fail")
    }

    #[test]
    fn test_expression() {
        assert_eq!(compile("name"), Instruction::Eval(Expr::ident("name")));
    }

    #[test]
    fn test_encode() {
        assert_eq!(compile(":name"), Instruction::Encode(Expr::ident("name")));
        assert_eq!(compile(": name"), Instruction::Encode(Expr::ident("name")));
    }

    #[test]
    fn test_extends() {
        assert_eq!(compile("extends 'layout'"), Instruction::Extends(Expr::str("layout")));
    }

    #[test]
    fn test_include_with_data() {
        let Instruction::Include { path, data, content } = compile("include 'item', {title: 'a'}")
        else {
            panic!("expected include");
        };
        assert_eq!(path, Expr::str("item"));
        assert_eq!(
            data,
            Some(Expr::Object(vec![Prop::KeyValue(
                PropKey::Named("title".to_string()),
                Expr::str("a")
            )]))
        );
        assert!(!content);
    }

    #[test]
    fn test_include_content() {
        assert_eq!(
            compile("include:content 'header'"),
            Instruction::Include {
                path: Expr::str("header"),
                data: None,
                content: true,
            }
        );
        assert_eq!(compile("endinclude"), Instruction::IncludeEnd);
    }

    #[test]
    fn test_include_rejects_third_argument() {
        let err = fail("include 'a', {}, 3");
        assert_eq!(err.kind, SyntaxErrorKind::InvalidExpression);
    }

    #[test]
    fn test_blocks() {
        assert_eq!(compile("block nav"), Instruction::BlockOpen("nav".to_string()));
        assert_eq!(compile("endblock"), Instruction::BlockClose);
    }

    #[test]
    fn test_invalid_block_name() {
        let err = fail("block main nav");
        assert_eq!(err.kind, SyntaxErrorKind::InvalidName);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_put_and_exists() {
        assert_eq!(compile("put jack"), Instruction::Put("jack".to_string()));
        assert_eq!(
            compile("exists jack"),
            Instruction::If {
                test: Condition::Exists("jack".to_string()),
                alt: UNPATCHED,
            }
        );
        assert_eq!(
            compile("existsNot jack"),
            Instruction::If {
                test: Condition::NotExists("jack".to_string()),
                alt: UNPATCHED,
            }
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(compile("* a comment *"), Instruction::Comment);
        assert_eq!(compile("*another one*"), Instruction::Comment);
        assert_eq!(compile("* spans\n lines *"), Instruction::Comment);
    }

    #[test]
    fn test_conditionals() {
        assert!(matches!(compile("if x"), Instruction::If { test: Condition::Truthy(_), .. }));
        assert!(matches!(compile("else if x"), Instruction::ElseIf { .. }));
        assert!(matches!(compile("else   if x"), Instruction::ElseIf { .. }));
        assert_eq!(compile("else"), Instruction::Else { end: UNPATCHED });
        assert_eq!(compile("end"), Instruction::End);
    }

    #[test]
    fn test_for_loop() {
        let Instruction::Loop(l) = compile("for name, index in names") else {
            panic!("expected loop");
        };
        assert_eq!(l.kind, LoopKind::For);
        assert_eq!(l.value, "name");
        assert_eq!(l.key.as_deref(), Some("index"));
        assert_eq!(l.source, Expr::ident("names"));
    }

    #[test]
    fn test_each_loop_without_index() {
        let Instruction::Loop(l) = compile("each item in [1, 2]") else {
            panic!("expected loop");
        };
        assert_eq!(l.kind, LoopKind::Each);
        assert_eq!(l.key, None);
        assert_eq!(
            l.source,
            Expr::Array(vec![
                crate::compiler::ast::Element::Item(Expr::Lit(Lit::Number(1.0))),
                crate::compiler::ast::Element::Item(Expr::Lit(Lit::Number(2.0))),
            ])
        );
    }

    #[test]
    fn test_loop_source_spanning_lines() {
        let Instruction::Loop(l) = compile("for name in list.map((n) => {\n return n;\n })") else {
            panic!("expected loop");
        };
        assert!(matches!(l.source, Expr::Call { .. }));
    }

    #[test]
    fn test_invalid_loops() {
        assert_eq!(fail("for name of names").kind, SyntaxErrorKind::InvalidLoop);
        assert_eq!(fail("each a, b, c in x").kind, SyntaxErrorKind::InvalidLoop);
        assert_eq!(fail("for 1x in y").kind, SyntaxErrorKind::InvalidLoop);
    }

    #[test]
    fn test_tag() {
        assert_eq!(
            compile("asset '../images/calvin.png'"),
            Instruction::Tag {
                name: "asset".to_string(),
                first_arg: Expr::str("../images/calvin.png"),
                data: None,
                content: false,
            }
        );
    }

    #[test]
    fn test_content_tag() {
        assert!(matches!(
            compile("tag:content 'textarea'"),
            Instruction::Tag { content: true, .. }
        ));
        assert_eq!(compile("endtag"), Instruction::TagEnd("tag".to_string()));
    }

    #[test]
    fn test_content_on_plain_tag_is_rejected() {
        assert_eq!(
            fail("asset:content 'x'").kind,
            SyntaxErrorKind::ContentNotAccepted
        );
    }

    #[test]
    fn test_tag_name_needs_argument() {
        assert_eq!(compile("asset"), Instruction::Eval(Expr::ident("asset")));
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            compile("@logo"),
            Instruction::Shortcut {
                name: "logo".to_string(),
                data: None,
                content: false,
            }
        );
        assert!(matches!(
            compile("@header {title: 'Welcome'}"),
            Instruction::Shortcut { data: Some(_), content: false, .. }
        ));
        assert!(matches!(
            compile("@header:content"),
            Instruction::Shortcut { data: None, content: true, .. }
        ));
        assert_eq!(compile("endheader"), Instruction::ShortcutEnd("header".to_string()));
    }

    #[test]
    fn test_shortcut_with_period() {
        assert_eq!(
            compile("@page.info:content {title: 'page'}"),
            Instruction::Shortcut {
                name: "page.info".to_string(),
                data: Some(Expr::Object(vec![Prop::KeyValue(
                    PropKey::Named("title".to_string()),
                    Expr::str("page")
                )])),
                content: true,
            }
        );
        assert_eq!(
            compile("endpage.info"),
            Instruction::ShortcutEnd("page.info".to_string())
        );
    }

    #[test]
    fn test_unknown_shortcut_is_an_expression_error() {
        assert_eq!(fail("@missing").kind, SyntaxErrorKind::InvalidExpression);
    }

    #[test]
    fn test_expression_error_offset() {
        let err = fail("foo}");
        assert_eq!(err.kind, SyntaxErrorKind::InvalidExpression);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_empty_directive() {
        assert_eq!(fail("").kind, SyntaxErrorKind::EmptyDirective);
    }
}
