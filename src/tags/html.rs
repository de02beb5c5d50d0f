//! The default `tag` tag: builds an HTML element.
//!
//! `{{tag 'a', {href: url, content: 'Home'}}}` renders `<a href="...">Home</a>`.
//! Attributes come from the data object in order. `true` renders a bare
//! attribute, other falsy values except the empty string are dropped.
//! `value` is an attribute only on elements that carry one; elsewhere it
//! is the element text when there is no `content`.

use super::TagEngine;
use crate::value::Value;

/// Void elements, rendered without a closing tag.
const SINGLETON_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose `value` is an attribute.
const VALUE_TAGS: &[&str] = &["button", "input", "li", "meter", "option", "param", "progress"];

pub(super) fn render(name: &Value, data: &Value, _engine: &TagEngine<'_>) -> anyhow::Result<String> {
    Ok(element(&name.to_text(), data))
}

fn element(name: &str, data: &Value) -> String {
    let value_tag = VALUE_TAGS.contains(&name);
    let mut out = format!("<{}", name);

    if let Some(attrs) = data.as_object() {
        for (key, value) in attrs {
            let present = value.is_truthy() || matches!(value, Value::String(_));
            let attribute = match key.as_str() {
                "content" => false,
                "value" => value_tag,
                _ => true,
            };
            if !(present && attribute) {
                continue;
            }
            match value {
                Value::Bool(true) => {
                    out.push(' ');
                    out.push_str(key);
                }
                _ => out.push_str(&format!(" {}=\"{}\"", key, value)),
            }
        }
    }
    out.push('>');

    if SINGLETON_TAGS.contains(&name) {
        return out;
    }

    let content = data.get("content");
    let value = data.get("value");
    if content.is_truthy() {
        out.push_str(&content.to_text());
    } else if !value_tag && value.is_truthy() {
        out.push_str(&value.to_text());
    }
    out.push_str(&format!("</{}>", name));
    out
}
