//! Custom tags and shortcuts.
//!
//! A tag is a host renderer invoked as `{{name firstArg, data}}`, or with
//! content as `{{name:content firstArg, data}}...{{endname}}`. A shortcut
//! `{{@alias data}}` calls a configured tag with a fixed first argument.

mod html;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::compiler::Grammar;
use crate::config::ShortcutConfig;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::value::Value;

/// Renders a tag.
///
/// Implemented for every `Fn(&Value, &Value, &TagEngine) -> anyhow::Result<String>`.
/// `data` is always an object; content tags find their captured output
/// under `content`.
pub trait TagRenderer: Send + Sync {
    fn render(&self, first_arg: &Value, data: &Value, engine: &TagEngine<'_>) -> anyhow::Result<String>;
}

impl<F> TagRenderer for F
where
    F: Fn(&Value, &Value, &TagEngine<'_>) -> anyhow::Result<String> + Send + Sync,
{
    fn render(&self, first_arg: &Value, data: &Value, engine: &TagEngine<'_>) -> anyhow::Result<String> {
        self(first_arg, data, engine)
    }
}

/// A registered tag.
///
/// ```
/// use beard::TagDefinition;
///
/// let asset = TagDefinition::new(|path, _data, _engine| Ok(format!("/dist{}", path)))
///     .first_arg_is_path();
/// assert!(asset.resolves_path());
/// assert!(!asset.accepts_content());
/// ```
#[derive(Clone)]
pub struct TagDefinition {
    renderer: Arc<dyn TagRenderer>,
    first_arg_is_path: bool,
    content: bool,
}

impl TagDefinition {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Value, &Value, &TagEngine<'_>) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self::from_renderer(render)
    }

    pub fn from_renderer(renderer: impl TagRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
            first_arg_is_path: false,
            content: false,
        }
    }

    /// Resolve the first argument as a template path before rendering.
    pub fn first_arg_is_path(mut self) -> Self {
        self.first_arg_is_path = true;
        self
    }

    /// Accept the `name:content` form.
    pub fn content(mut self) -> Self {
        self.content = true;
        self
    }

    pub fn resolves_path(&self) -> bool {
        self.first_arg_is_path
    }

    pub fn accepts_content(&self) -> bool {
        self.content
    }

    pub(crate) fn renderer(&self) -> &dyn TagRenderer {
        self.renderer.as_ref()
    }
}

impl fmt::Debug for TagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDefinition")
            .field("first_arg_is_path", &self.first_arg_is_path)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

/// Tags known to an engine. Starts with the HTML `tag` helper.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    tags: FxHashMap<String, TagDefinition>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRegistry {
    pub fn new() -> Self {
        let mut tags = FxHashMap::default();
        tags.insert(
            "tag".to_string(),
            TagDefinition::new(html::render).content(),
        );
        Self { tags }
    }

    /// Adds a tag, replacing any tag of the same name.
    pub fn insert(&mut self, name: impl Into<String>, definition: TagDefinition) {
        self.tags.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        self.tags.get(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Checks tag names and that every shortcut names a registered tag.
    pub fn validate(&self, shortcuts: &BTreeMap<String, ShortcutConfig>) -> Result<()> {
        for name in self.tags.keys() {
            if !valid_name(name) {
                return Err(Error::Config(format!("invalid tag name `{}`", name)));
            }
        }
        for (alias, shortcut) in shortcuts {
            if !self.tags.contains_key(&shortcut.tag) {
                return Err(Error::Config(format!(
                    "shortcut `{}` refers to unknown tag `{}`",
                    alias, shortcut.tag
                )));
            }
        }
        Ok(())
    }

    /// The directive forms these tags and `shortcuts` add.
    pub fn grammar(&self, shortcuts: &BTreeMap<String, ShortcutConfig>) -> Grammar {
        let mut names: Vec<&String> = self.tags.keys().collect();
        names.sort();

        let mut grammar = Grammar::new();
        for name in names {
            grammar = grammar.tag(name.as_str(), self.tags[name].accepts_content());
        }
        for (alias, shortcut) in shortcuts {
            let content = self
                .tags
                .get(&shortcut.tag)
                .is_some_and(TagDefinition::accepts_content);
            grammar = grammar.shortcut(alias.as_str(), content);
        }
        grammar
    }
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | '.'))
}

/// Where a tag was called from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallSite<'a> {
    pub path: &'a str,
    pub line: usize,
    pub directive: &'a str,
    pub depth: usize,
}

/// The engine as seen from inside a tag renderer.
///
/// Renders started here count towards the caller's nesting depth.
pub struct TagEngine<'a> {
    pub(crate) engine: &'a Engine,
    pub(crate) site: CallSite<'a>,
}

impl TagEngine<'_> {
    /// Renders the template at `path`, with top-level path rules.
    pub fn render(&self, path: &str, data: impl Into<Value>) -> Result<String> {
        self.engine.render_at(path, data.into(), self.site.depth)
    }

    /// Renders template source text.
    pub fn render_str(&self, source: &str, data: impl Into<Value>) -> Result<String> {
        self.engine.render_str_at(source, data.into(), self.site.depth)
    }

    /// Handle of the template at `path`, resolved against the caller.
    pub fn handle(&self, path: &str) -> Option<Value> {
        self.engine.handle(&self.resolve(path))
    }

    /// Resolves `path` against the calling template.
    pub fn resolve(&self, path: &str) -> String {
        self.engine.resolve(path, self.site.path)
    }

    /// Path of the calling template.
    pub fn caller(&self) -> &str {
        self.site.path
    }

    pub fn line(&self) -> usize {
        self.site.line
    }

    pub fn depth(&self) -> usize {
        self.site.depth
    }
}

/// Unwraps engine errors returned through a renderer, wraps anything else.
pub(crate) fn tag_error(err: anyhow::Error, name: &str, site: &CallSite<'_>) -> Error {
    match err.downcast::<Error>() {
        Ok(inner) => inner,
        Err(source) => Error::Tag {
            name: name.to_string(),
            path: site.path.to_string(),
            line: site.line,
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TagDefinition {
        TagDefinition::new(|_, _, _| Ok(String::new()))
    }

    fn shortcuts(entries: &[(&str, &str)]) -> BTreeMap<String, ShortcutConfig> {
        entries
            .iter()
            .map(|(alias, tag)| {
                (
                    alias.to_string(),
                    ShortcutConfig {
                        tag: tag.to_string(),
                        path: format!("/components/{}", alias),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_default_tag_accepts_content() {
        let registry = TagRegistry::new();
        let tag = registry.get("tag").expect("default tag");
        assert!(tag.accepts_content());
        assert!(!tag.resolves_path());
    }

    #[test]
    fn test_shortcut_to_unknown_tag() {
        let registry = TagRegistry::new();
        let err = registry
            .validate(&shortcuts(&[("header", "component")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_tag_name() {
        let mut registry = TagRegistry::new();
        registry.insert("my tag", noop());
        assert!(registry.validate(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_grammar_from_registry() {
        let mut registry = TagRegistry::new();
        registry.insert("asset", noop().first_arg_is_path());
        registry.insert("component", noop().content());
        let grammar = registry.grammar(&shortcuts(&[("header", "component"), ("logo", "asset")]));

        let tags: Vec<(&str, bool)> = grammar
            .tags()
            .iter()
            .map(|t| (t.name.as_str(), t.content))
            .collect();
        assert_eq!(tags, vec![("asset", false), ("component", true), ("tag", true)]);

        let shortcuts: Vec<(&str, bool)> = grammar
            .shortcuts()
            .iter()
            .map(|s| (s.alias.as_str(), s.content))
            .collect();
        assert_eq!(shortcuts, vec![("header", true), ("logo", false)]);
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let site = CallSite {
            path: "/view",
            line: 2,
            directive: "asset 'x'",
            depth: 1,
        };
        let inner = Error::DepthExceeded {
            path: "/loop".to_string(),
            limit: 4,
        };
        assert!(matches!(
            tag_error(anyhow::Error::new(inner), "component", &site),
            Error::DepthExceeded { limit: 4, .. }
        ));
        assert!(matches!(
            tag_error(anyhow::anyhow!("boom"), "component", &site),
            Error::Tag { line: 2, .. }
        ));
    }
}
