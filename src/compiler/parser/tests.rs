use super::*;
use crate::compiler::ast::{BinaryOp, Element, FunctionBody, Lit, Prop, PropKey, Stmt, TemplatePart, UnaryOp};

fn parse(input: &str) -> Expr {
    Parser::parse_expression(input).expect("expression should parse")
}

fn parse_err(input: &str) -> ParseError {
    Parser::parse_expression(input).expect_err("expression should fail")
}

fn num(n: f64) -> Expr {
    Expr::Lit(Lit::Number(n))
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn member(object: Expr, property: &str) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: property.to_string(),
        optional: false,
    }
}

// =============================================================================
// Literals and identifiers
// =============================================================================

#[test]
fn test_literals() {
    assert_eq!(parse("42"), num(42.0));
    assert_eq!(parse("1.5e3"), num(1500.0));
    assert_eq!(parse("'hi'"), Expr::str("hi"));
    assert_eq!(parse("\"a\\nb\""), Expr::str("a\nb"));
    assert_eq!(parse("true"), Expr::Lit(Lit::Bool(true)));
    assert_eq!(parse("null"), Expr::Lit(Lit::Null));
    assert_eq!(parse("undefined"), Expr::Lit(Lit::Undefined));
}

#[test]
fn test_identifier() {
    assert_eq!(parse("user"), Expr::ident("user"));
    assert_eq!(parse("$el"), Expr::ident("$el"));
}

#[test]
fn test_template_literal() {
    assert_eq!(
        parse("`Hi ${name}!`"),
        Expr::Template(vec![
            TemplatePart::Text("Hi ".to_string()),
            TemplatePart::Expr(Expr::ident("name")),
            TemplatePart::Text("!".to_string()),
        ])
    );
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_precedence() {
    assert_eq!(
        parse("a + b * c"),
        binary(
            BinaryOp::Add,
            Expr::ident("a"),
            binary(BinaryOp::Mul, Expr::ident("b"), Expr::ident("c"))
        )
    );
}

#[test]
fn test_left_associative() {
    assert_eq!(
        parse("a - b - c"),
        binary(
            BinaryOp::Sub,
            binary(BinaryOp::Sub, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c")
        )
    );
}

#[test]
fn test_exponent_is_right_associative() {
    assert_eq!(
        parse("2 ** 3 ** 2"),
        binary(
            BinaryOp::Exp,
            num(2.0),
            binary(BinaryOp::Exp, num(3.0), num(2.0))
        )
    );
}

#[test]
fn test_grouping() {
    assert_eq!(
        parse("(a + b) * c"),
        binary(
            BinaryOp::Mul,
            binary(BinaryOp::Add, Expr::ident("a"), Expr::ident("b")),
            Expr::ident("c")
        )
    );
}

#[test]
fn test_logical_and_equality() {
    assert_eq!(
        parse("a === 1 && b || c"),
        binary(
            BinaryOp::Or,
            binary(
                BinaryOp::And,
                binary(BinaryOp::EqEqEq, Expr::ident("a"), num(1.0)),
                Expr::ident("b")
            ),
            Expr::ident("c")
        )
    );
}

#[test]
fn test_unary() {
    assert_eq!(
        parse("!done"),
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::ident("done")),
        }
    );
    assert_eq!(
        parse("typeof x === 'string'"),
        binary(
            BinaryOp::EqEqEq,
            Expr::Unary {
                op: UnaryOp::TypeOf,
                operand: Box::new(Expr::ident("x")),
            },
            Expr::str("string")
        )
    );
}

#[test]
fn test_conditional() {
    assert_eq!(
        parse("a ? b : c ? d : e"),
        Expr::Conditional {
            test: Box::new(Expr::ident("a")),
            consequent: Box::new(Expr::ident("b")),
            alternate: Box::new(Expr::Conditional {
                test: Box::new(Expr::ident("c")),
                consequent: Box::new(Expr::ident("d")),
                alternate: Box::new(Expr::ident("e")),
            }),
        }
    );
}

#[test]
fn test_in_operator() {
    assert_eq!(
        parse("'a' in obj"),
        binary(BinaryOp::In, Expr::str("a"), Expr::ident("obj"))
    );
}

// =============================================================================
// Postfix chains
// =============================================================================

#[test]
fn test_member_chain() {
    assert_eq!(
        parse("page.info.title"),
        member(member(Expr::ident("page"), "info"), "title")
    );
}

#[test]
fn test_optional_member() {
    assert_eq!(
        parse("user?.name"),
        Expr::Member {
            object: Box::new(Expr::ident("user")),
            property: "name".to_string(),
            optional: true,
        }
    );
}

#[test]
fn test_index_and_call() {
    assert_eq!(
        parse("items[0].toUpperCase()"),
        Expr::Call {
            callee: Box::new(member(
                Expr::Index {
                    object: Box::new(Expr::ident("items")),
                    index: Box::new(num(0.0)),
                    optional: false,
                },
                "toUpperCase"
            )),
            args: vec![],
            optional: false,
        }
    );
}

#[test]
fn test_keyword_as_property_name() {
    assert_eq!(parse("a.in"), member(Expr::ident("a"), "in"));
}

// =============================================================================
// Arrays, objects and functions
// =============================================================================

#[test]
fn test_array_with_spread() {
    assert_eq!(
        parse("[1, ...rest]"),
        Expr::Array(vec![
            Element::Item(num(1.0)),
            Element::Spread(Expr::ident("rest")),
        ])
    );
}

#[test]
fn test_object_literal() {
    assert_eq!(
        parse("{title: 'a', name, 'x-y': 1, [key]: 2, ...rest}"),
        Expr::Object(vec![
            Prop::KeyValue(PropKey::Named("title".to_string()), Expr::str("a")),
            Prop::Shorthand("name".to_string()),
            Prop::KeyValue(PropKey::Named("x-y".to_string()), num(1.0)),
            Prop::KeyValue(PropKey::Computed(Expr::ident("key")), num(2.0)),
            Prop::Spread(Expr::ident("rest")),
        ])
    );
}

#[test]
fn test_trailing_commas() {
    assert_eq!(parse("[1,]"), Expr::Array(vec![Element::Item(num(1.0))]));
    assert_eq!(
        parse("{a: 1,}"),
        Expr::Object(vec![Prop::KeyValue(PropKey::Named("a".to_string()), num(1.0))])
    );
}

#[test]
fn test_arrow_functions() {
    let Expr::Function(single) = parse("x => x * 2") else {
        panic!("expected function");
    };
    assert_eq!(single.params, vec!["x".to_string()]);
    assert_eq!(
        single.body,
        FunctionBody::Expr(binary(BinaryOp::Mul, Expr::ident("x"), num(2.0)))
    );

    let Expr::Function(pair) = parse("(a, b) => { const s = a + b; return s; }") else {
        panic!("expected function");
    };
    assert_eq!(pair.params, vec!["a".to_string(), "b".to_string()]);
    let FunctionBody::Block(body) = &pair.body else {
        panic!("expected block body");
    };
    assert_eq!(body.len(), 2);
    assert_eq!(body[1], Stmt::Return(Some(Expr::ident("s"))));
}

#[test]
fn test_function_expression() {
    let Expr::Function(f) = parse("function (a) { return a; }") else {
        panic!("expected function");
    };
    assert_eq!(f.params, vec!["a".to_string()]);
}

#[test]
fn test_parenthesised_expression_is_not_arrow() {
    assert_eq!(parse("(a)"), Expr::ident("a"));
}

// =============================================================================
// Arguments
// =============================================================================

#[test]
fn test_arguments() {
    let args = Parser::parse_arguments("'header', {title: t}", 2).expect("arguments should parse");
    assert_eq!(args.len(), 2);
    assert_eq!(args[0], Expr::str("header"));
}

#[test]
fn test_too_many_arguments() {
    let err = Parser::parse_arguments("a, b, c", 2).expect_err("should fail");
    assert_eq!(err.kind, ParseErrorKind::ArgumentCount);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_missing_closing_paren() {
    let err = parse_err("(a + b");
    assert_eq!(err.kind, ParseErrorKind::MissingClosingParen);
    assert_eq!(err.position, 6);
}

#[test]
fn test_missing_closing_brace() {
    assert_eq!(parse_err("{a: 1").kind, ParseErrorKind::MissingClosingBrace);
}

#[test]
fn test_missing_conditional_colon() {
    assert_eq!(
        parse_err("a ? b").kind,
        ParseErrorKind::MissingConditionalColon
    );
}

#[test]
fn test_trailing_tokens() {
    let err = parse_err("a b");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert_eq!(err.position, 2);
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_err("").kind, ParseErrorKind::UnexpectedEof);
}

#[test]
fn test_missing_property_name() {
    assert_eq!(parse_err("a.").kind, ParseErrorKind::MissingPropertyName);
}
