//! The engine: configuration, template lookup, caching and rendering.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::TemplateCache;
use crate::compiler::{CompiledUnit, Grammar, compile_with};
use crate::config::{EngineConfig, ShortcutConfig};
use crate::error::{Error, Result};
use crate::path::resolve_path;
use crate::runtime::{EvalError, RenderContext, interpreter};
use crate::source::TemplateSource;
use crate::tags::{CallSite, TagDefinition, TagEngine, TagRegistry, tag_error};
use crate::value::{Object, Value};

/// Compiles and renders templates from a [`TemplateSource`].
///
/// ```
/// use beard::{Engine, MemorySource};
/// use serde_json::json;
///
/// let engine = Engine::new(MemorySource::new().with_template("/hello", "Hello {{name}}!"));
/// assert_eq!(engine.render("/hello", json!({"name": "world"})).unwrap(), "Hello world!");
/// ```
pub struct Engine {
    config: EngineConfig,
    source: Box<dyn TemplateSource>,
    tags: TagRegistry,
    grammar: Grammar,
    cache: TemplateCache,
}

impl Engine {
    /// An engine with default configuration and only the builtin `tag` tag.
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        let config = EngineConfig::default();
        let tags = TagRegistry::new();
        let grammar = tags.grammar(&config.shortcuts);
        Self {
            cache: TemplateCache::new(config.development),
            config,
            source: Box::new(source),
            tags,
            grammar,
        }
    }

    pub fn builder(source: impl TemplateSource + 'static) -> EngineBuilder {
        EngineBuilder {
            config: EngineConfig::default(),
            source: Box::new(source),
            tags: TagRegistry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// The directive grammar templates are compiled with.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Renders the template at `path`.
    ///
    /// With a configured root, a path that does not start with `/` or `~`
    /// is taken relative to the root.
    pub fn render(&self, path: &str, data: impl Into<Value>) -> Result<String> {
        self.render_at(path, data.into(), 0)
    }

    /// Renders template source text. Relative paths inside it resolve
    /// against the root.
    pub fn render_str(&self, source: &str, data: impl Into<Value>) -> Result<String> {
        self.render_str_at(source, data.into(), 0)
    }

    /// The compiled unit for `path` as referenced from `referencing`.
    pub fn compiled(&self, path: &str, referencing: &str) -> Result<Arc<CompiledUnit>> {
        self.load(&self.resolve(path, referencing), referencing)
    }

    /// Resolves `path` as referenced from the template at `referencing`.
    pub fn resolve(&self, path: &str, referencing: &str) -> String {
        resolve_path(path, referencing, self.config.root.as_deref())
    }

    /// The handle the source provides for a resolved path.
    pub fn handle(&self, path: &str) -> Option<Value> {
        self.source.handle(path)
    }

    pub(crate) fn render_at(&self, path: &str, data: Value, depth: usize) -> Result<String> {
        let path = self.entry_path(path);
        debug!(path = %path, depth, "rendering template");
        let mut ctx = RenderContext::at_depth(data.into_object(), depth);
        self.render_path(&path, "", &mut ctx)
    }

    pub(crate) fn render_str_at(&self, source: &str, data: Value, depth: usize) -> Result<String> {
        let path = match self.config.root.as_deref() {
            Some(root) => format!("{}/", root.trim_end_matches('/')),
            None => "/".to_string(),
        };
        self.check_depth(&path, depth)?;
        debug!(path = %path, depth, "rendering inline template");

        let unit = self.cache.get_or_compile_inline(source, &path, || {
            Ok(compile_with(source, &path, &self.grammar)?)
        })?;
        let mut ctx = RenderContext::at_depth(data.into_object(), depth + 1);
        interpreter::run(self, &unit, &mut ctx)
    }

    /// Renders `path` resolved against `referencing` with the given context.
    pub(crate) fn render_path(
        &self,
        path: &str,
        referencing: &str,
        ctx: &mut RenderContext,
    ) -> Result<String> {
        let resolved = self.resolve(path, referencing);
        self.check_depth(&resolved, ctx.depth)?;
        let unit = self.load(&resolved, referencing)?;

        ctx.depth += 1;
        let result = interpreter::run(self, &unit, ctx);
        ctx.depth -= 1;
        result
    }

    pub(crate) fn render_tag(
        &self,
        name: &str,
        first_arg: Value,
        data: Object,
        site: &CallSite<'_>,
    ) -> Result<String> {
        let definition = self
            .tags
            .get(name)
            .ok_or_else(|| Error::Config(format!("unknown tag `{}`", name)))?;

        let first_arg = match first_arg {
            Value::String(path) if definition.resolves_path() => {
                Value::from(self.resolve(&path, site.path))
            }
            other if definition.resolves_path() => {
                return Err(Error::Eval {
                    path: site.path.to_string(),
                    line: site.line,
                    directive: site.directive.to_string(),
                    source: EvalError::InvalidPath {
                        found: other.type_of(),
                    },
                });
            }
            other => other,
        };

        trace!(tag = name, from = site.path, line = site.line, "calling tag");
        let engine = TagEngine { engine: self, site: *site };
        definition
            .renderer()
            .render(&first_arg, &Value::from(data), &engine)
            .map_err(|err| tag_error(err, name, site))
    }

    pub(crate) fn render_shortcut(
        &self,
        alias: &str,
        data: Object,
        site: &CallSite<'_>,
    ) -> Result<String> {
        let shortcut = self
            .config
            .shortcuts
            .get(alias)
            .ok_or_else(|| Error::Config(format!("unknown shortcut `{}`", alias)))?;
        trace!(shortcut = alias, tag = %shortcut.tag, "expanding shortcut");
        self.render_tag(&shortcut.tag, Value::from(shortcut.path.as_str()), data, site)
    }

    /// Path a top-level render starts from.
    fn entry_path(&self, path: &str) -> String {
        match self.config.root.as_deref() {
            Some(root) if !path.starts_with('/') && !path.starts_with('~') => {
                self.resolve(&format!("{}/{}", root, path), "")
            }
            _ => self.resolve(path, ""),
        }
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<()> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                path: path.to_string(),
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn load(&self, resolved: &str, referencing: &str) -> Result<Arc<CompiledUnit>> {
        self.cache.get_or_compile(resolved, || {
            let source = self.source.source(resolved).ok_or_else(|| Error::Resolution {
                path: resolved.to_string(),
                referenced_from: if referencing.is_empty() {
                    "<render>".to_string()
                } else {
                    referencing.to_string()
                },
            })?;
            Ok(compile_with(&source, resolved, &self.grammar)?)
        })
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("tags", &self.tags)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Assembles an [`Engine`].
///
/// ```
/// use beard::{Engine, MemorySource, TagDefinition};
/// use serde_json::json;
///
/// let engine = Engine::builder(
///     MemorySource::new()
///         .with_template("/views/home", "{{@logo}}")
///         .with_template("/images/logo.png", ""),
/// )
/// .tag(
///     "asset",
///     TagDefinition::new(|path, _, _| Ok(format!("/dist{}", path))).first_arg_is_path(),
/// )
/// .shortcut("logo", "asset", "/images/logo.png")
/// .build()
/// .unwrap();
/// assert_eq!(engine.render("/views/home", json!({})).unwrap(), "/dist/images/logo.png");
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    source: Box<dyn TemplateSource>,
    tags: TagRegistry,
}

impl EngineBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.config.root = Some(root.into());
        self
    }

    pub fn development(mut self, development: bool) -> Self {
        self.config.development = development;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Registers a tag. A tag named `tag` replaces the HTML helper.
    pub fn tag(mut self, name: impl Into<String>, definition: TagDefinition) -> Self {
        self.tags.insert(name, definition);
        self
    }

    /// Adds `{{@alias}}` as a call of `tag` with `path` as first argument.
    pub fn shortcut(
        mut self,
        alias: impl Into<String>,
        tag: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.config.shortcuts.insert(
            alias.into(),
            ShortcutConfig {
                tag: tag.into(),
                path: path.into(),
            },
        );
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;
        self.tags.validate(&self.config.shortcuts)?;
        let grammar = self.tags.grammar(&self.config.shortcuts);

        debug!(
            tags = self.tags.len(),
            shortcuts = self.config.shortcuts.len(),
            development = self.config.development,
            "engine ready"
        );

        Ok(Engine {
            cache: TemplateCache::new(self.config.development),
            config: self.config,
            source: self.source,
            tags: self.tags,
            grammar,
        })
    }
}
