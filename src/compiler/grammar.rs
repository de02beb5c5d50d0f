//! The configurable part of the directive grammar: which tag names and
//! shortcut aliases are recognised, and which of them accept content.

/// A tag directive form: `{{name arg}}`, and with content
/// `{{name:content arg}}...{{endname}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagForm {
    pub name: String,
    pub content: bool,
}

/// A shortcut directive form: `{{@alias data}}`, and with content
/// `{{@alias:content data}}...{{endalias}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutForm {
    pub alias: String,
    pub content: bool,
}

/// Tag names and shortcut aliases known to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    tags: Vec<TagForm>,
    shortcuts: Vec<ShortcutForm>,
}

impl Grammar {
    /// A grammar with no tags or shortcuts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag form.
    pub fn tag(mut self, name: impl Into<String>, content: bool) -> Self {
        self.tags.push(TagForm {
            name: name.into(),
            content,
        });
        self
    }

    /// Adds a shortcut form. Aliases are matched longest first, so
    /// `page.info` is found before `page`.
    pub fn shortcut(mut self, alias: impl Into<String>, content: bool) -> Self {
        self.shortcuts.push(ShortcutForm {
            alias: alias.into(),
            content,
        });
        self.shortcuts
            .sort_by(|a, b| b.alias.len().cmp(&a.alias.len()).then(a.alias.cmp(&b.alias)));
        self
    }

    pub fn tags(&self) -> &[TagForm] {
        &self.tags
    }

    pub fn shortcuts(&self) -> &[ShortcutForm] {
        &self.shortcuts
    }
}
