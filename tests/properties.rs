//! Property tests: literal text passes through untouched, compilation and
//! rendering are deterministic, encoding removes markup characters, and
//! resolved paths are normalized.

use beard::path::{normalize, resolve_path};
use beard::{Engine, MemorySource, compile, encode};
use proptest::prelude::*;
use serde_json::json;

// =============================================================================
// Strategies
// =============================================================================

/// Balanced template fragments that always compile.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("plain text "),
        Just("{{name}}"),
        Just("{{:name}}"),
        Just("{{put missing}}"),
        Just("{{* note *}}"),
        Just("{{if flag}}yes{{else}}no{{end}}"),
        Just("{{each item, i in items}}[{{i}}:{{item}}]{{end}}"),
        Just("{{for v, k in obj}}{{k}}={{v}};{{end}}"),
        Just("{{block side}}side{{endblock}}"),
        Just("{{exists side}}has side{{end}}"),
        Just("\n"),
    ]
}

fn template() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

fn data() -> serde_json::Value {
    json!({
        "name": "<Calvin & Co>",
        "flag": true,
        "items": ["a", "b"],
        "obj": {"x": 1, "y": "two"}
    })
}

proptest! {
    #[test]
    fn literal_text_passes_through(text in "[^{}]{0,64}") {
        let engine = Engine::new(MemorySource::new().with_template("/t", text.clone()));
        prop_assert_eq!(engine.render("/t", json!({}))?, text);
    }

    #[test]
    fn text_around_directive_is_kept(prefix in "[^{}]{0,24}", suffix in "[^{}]{0,24}") {
        let source = format!("{}{{{{value}}}}{}", prefix, suffix);
        let engine = Engine::new(MemorySource::new().with_template("/t", source));
        let rendered = engine.render("/t", json!({"value": "V"}))?;
        prop_assert_eq!(rendered, format!("{}V{}", prefix, suffix));
    }

    #[test]
    fn compilation_is_deterministic(source in template()) {
        let first = compile(&source, "/t")?;
        let second = compile(&source, "/t")?;
        prop_assert_eq!(first.statements(), second.statements());
    }

    #[test]
    fn rendering_is_deterministic(source in template()) {
        let engine = Engine::new(MemorySource::new().with_template("/t", source));
        let first = engine.render("/t", data())?;
        let second = engine.render("/t", data())?;
        prop_assert_eq!(first, second);
    }

    #[test]
    fn encoded_text_has_no_markup(text in ".{0,64}") {
        let encoded = encode(&text);
        prop_assert!(!encoded.contains(['<', '>', '"', '\'', '/']));
    }

    #[test]
    fn resolved_paths_are_normalized(
        segments in prop::collection::vec(prop_oneof![
            Just(".."), Just("."), Just(""), Just("views"), Just("a"), Just("b.png")
        ], 0..8),
        referencing in prop_oneof![Just("/views/page"), Just("/"), Just("")],
    ) {
        let path = segments.join("/");
        let resolved = resolve_path(&path, referencing, Some("/site"));
        prop_assert!(resolved.starts_with('/'));
        prop_assert!(!resolved.split('/').any(|s| s == ".." || s == "."));
        prop_assert_eq!(normalize(&resolved), resolved.clone());
    }
}
