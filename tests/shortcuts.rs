//! `{{@alias}}` shortcuts: plain, with data, with content and dotted names.

use beard::{Engine, EngineBuilder, EngineConfig, Error, MemorySource, SyntaxErrorKind, TagDefinition};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn builder(templates: &[(&str, &str)]) -> EngineBuilder {
    Engine::builder(templates.iter().copied().collect::<MemorySource>())
        .tag(
            "asset",
            TagDefinition::new(|path, _, _| Ok(format!("/dist{}", path))).first_arg_is_path(),
        )
        .tag(
            "component",
            TagDefinition::new(|path, data, engine| {
                Ok(engine.render(&path.to_text(), data.clone())?)
            })
            .first_arg_is_path()
            .content(),
        )
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Shortcuts
// =============================================================================

#[test]
fn test_shortcut_to_tag() {
    let engine = builder(&[("/views/content", "{{@logo}}")])
        .shortcut("logo", "asset", "/images/logo.png")
        .build()
        .unwrap();
    assert_eq!(
        engine.render("/views/content", json!({})).unwrap(),
        "/dist/images/logo.png"
    );
}

#[test]
fn test_shortcut_with_data() {
    let engine = builder(&[
        ("/views/content", "{{@header {title: 'Welcome To The'}}}"),
        ("/header", "{{title}} component"),
    ])
    .shortcut("header", "component", "/header")
    .build()
    .unwrap();
    assert_eq!(
        engine.render("/views/content", json!({})).unwrap(),
        "Welcome To The component"
    );
}

#[test]
fn test_shortcut_with_content() {
    let engine = builder(&[
        (
            "/templates/view",
            "top
            {{@header:content {title: 'title'}}}
              some content
            {{endheader}}",
        ),
        ("/header", "{{title}} {{content}}"),
    ])
    .shortcut("header", "component", "/header")
    .build()
    .unwrap();
    assert_eq!(
        squash(&engine.render("/templates/view", json!({})).unwrap()),
        "top title some content"
    );
}

#[test]
fn test_shortcut_content_with_inline_blocks() {
    let engine = builder(&[
        (
            "/templates/view",
            "top
            {{@header:content}}
              {{block button}}
                 a button
              {{endblock}}

              {{block actions}}
                  some actions
              {{endblock}}
              <h1>hello world</h1>
            {{endheader}}",
        ),
        ("/header", "{{content}} {{button}} {{actions}} component"),
    ])
    .shortcut("header", "component", "/header")
    .build()
    .unwrap();
    assert_eq!(
        squash(&engine.render("/templates/view", json!({})).unwrap()),
        "top <h1>hello world</h1> a button some actions component"
    );
}

#[test]
fn test_shortcut_content_with_blocks_and_data() {
    let engine = builder(&[
        (
            "/templates/view",
            "top
            {{@header:content { button: 'data button' }}}
              {{block actions}}some actions{{endblock}}
              <h1>hello world</h1>
            {{endheader}}",
        ),
        ("/header", "{{content}} {{button}} {{actions}} component"),
    ])
    .shortcut("header", "component", "/header")
    .build()
    .unwrap();
    assert_eq!(
        squash(&engine.render("/templates/view", json!({})).unwrap()),
        "top <h1>hello world</h1> data button some actions component"
    );
}

#[test]
fn test_shortcut_with_period_in_name() {
    let engine = builder(&[
        (
            "/view",
            "top
            {{@page.info:content {title: 'page'}}}
              info
            {{endpage.info}}",
        ),
        ("/components/info", "{{title}} {{content}}"),
        ("/components/page", "wrong"),
    ])
    .shortcut("page", "component", "/components/page")
    .shortcut("page.info", "component", "/components/info")
    .build()
    .unwrap();
    assert_eq!(
        squash(&engine.render("/view", json!({})).unwrap()),
        "top page info"
    );
}

#[test]
fn test_shortcuts_from_config() {
    let config: EngineConfig = serde_json::from_value(json!({
        "shortcuts": {
            "logo": { "tag": "asset", "path": "/images/logo.png" }
        }
    }))
    .unwrap();
    let engine = builder(&[("/view", "<img src=\"{{@logo}}\">")])
        .config(config)
        .build()
        .unwrap();
    assert_eq!(
        engine.render("view", json!({})).unwrap(),
        "<img src=\"/dist/images/logo.png\">"
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_shortcut_to_unknown_tag_is_rejected() {
    let result = builder(&[])
        .shortcut("header", "missing", "/header")
        .build();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_content_on_plain_shortcut_fails_to_compile() {
    let engine = builder(&[("/view", "{{@logo:content}}x{{endlogo}}")])
        .shortcut("logo", "asset", "/images/logo.png")
        .build()
        .unwrap();
    match engine.render("view", json!({})) {
        Err(Error::Syntax(err)) => assert_eq!(err.kind, SyntaxErrorKind::ContentNotAccepted),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unclosed_shortcut_content() {
    let engine = builder(&[("/view", "{{@header:content}}x")])
        .shortcut("header", "component", "/header")
        .build()
        .unwrap();
    assert!(matches!(
        engine.render("view", json!({})),
        Err(Error::Syntax(_))
    ));
}
