use crate::block::BlockKind;
use crate::error::RegistryError;

/// Typing this character in a text block opens the command palette.
pub const PALETTE_TRIGGER: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Body,
    Large,
    XLarge,
    XXLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number,
}

/// How a text-bearing block is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub size: TextSize,
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    /// Left indentation in nesting levels.
    pub indent: u8,
    pub leading_border: bool,
    pub background: bool,
    pub marker: Option<ListMarker>,
}

impl TextStyle {
    pub const fn body() -> Self {
        Self {
            size: TextSize::Body,
            bold: false,
            italic: false,
            monospace: false,
            indent: 0,
            leading_border: false,
            background: false,
            marker: None,
        }
    }

    pub const fn heading(size: TextSize) -> Self {
        Self {
            size,
            bold: true,
            ..Self::body()
        }
    }

    pub const fn list(marker: ListMarker) -> Self {
        Self {
            indent: 1,
            marker: Some(marker),
            ..Self::body()
        }
    }

    pub const fn quote() -> Self {
        Self {
            italic: true,
            indent: 1,
            leading_border: true,
            ..Self::body()
        }
    }

    pub const fn code() -> Self {
        Self {
            monospace: true,
            background: true,
            ..Self::body()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Text(TextStyle),
    Image,
}

impl RenderStrategy {
    pub fn is_text(&self) -> bool {
        matches!(self, RenderStrategy::Text(_))
    }
}

/// Icon shown next to a block type in the command palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteIcon {
    Text,
    Heading,
    BulletedList,
    NumberedList,
    Quote,
    Code,
    Image,
}

/// Everything the editor needs to know about one block type.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    pub kind: BlockKind,
    pub label: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub shortcut: Option<String>,
    pub render: RenderStrategy,
    pub icon: PaletteIcon,
}

impl BlockSpec {
    pub fn new(
        kind: BlockKind,
        label: impl Into<String>,
        render: RenderStrategy,
        icon: PaletteIcon,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            description: None,
            keywords: Vec::new(),
            shortcut: None,
            render,
            icon,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn shortcut(mut self, prefix: impl Into<String>) -> Self {
        self.shortcut = Some(prefix.into());
        self
    }

    /// Case-insensitive substring match over label and keywords.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.label.to_lowercase().contains(&query)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutMatch {
    pub kind: BlockKind,
    pub prefix_len: usize,
}

/// The single table of block types: shortcut prefixes, render strategies and palette
/// entries all come from here.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    specs: Vec<BlockSpec>,
}

impl BlockRegistry {
    pub fn new(specs: impl IntoIterator<Item = BlockSpec>) -> Result<Self, RegistryError> {
        let mut registry = Self { specs: Vec::new() };
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    pub fn standard() -> Self {
        let specs = vec![
            BlockSpec::new(
                BlockKind::Paragraph,
                "Text",
                RenderStrategy::Text(TextStyle::body()),
                PaletteIcon::Text,
            )
            .description("Plain paragraph text.")
            .keywords(["paragraph", "plain", "p"]),
            BlockSpec::new(
                BlockKind::Heading1,
                "Heading 1",
                RenderStrategy::Text(TextStyle::heading(TextSize::XXLarge)),
                PaletteIcon::Heading,
            )
            .description("Large section heading.")
            .keywords(["h1", "title"])
            .shortcut("# "),
            BlockSpec::new(
                BlockKind::Heading2,
                "Heading 2",
                RenderStrategy::Text(TextStyle::heading(TextSize::XLarge)),
                PaletteIcon::Heading,
            )
            .description("Medium section heading.")
            .keywords(["h2", "subtitle"])
            .shortcut("## "),
            BlockSpec::new(
                BlockKind::Heading3,
                "Heading 3",
                RenderStrategy::Text(TextStyle::heading(TextSize::Large)),
                PaletteIcon::Heading,
            )
            .description("Small section heading.")
            .keywords(["h3"])
            .shortcut("### "),
            BlockSpec::new(
                BlockKind::List,
                "Bulleted list",
                RenderStrategy::Text(TextStyle::list(ListMarker::Bullet)),
                PaletteIcon::BulletedList,
            )
            .description("A bulleted list item.")
            .keywords(["bullet", "unordered", "ul"])
            .shortcut("- "),
            BlockSpec::new(
                BlockKind::OrderedList,
                "Numbered list",
                RenderStrategy::Text(TextStyle::list(ListMarker::Number)),
                PaletteIcon::NumberedList,
            )
            .description("A numbered list item.")
            .keywords(["ordered", "number", "ol"])
            .shortcut("1. "),
            BlockSpec::new(
                BlockKind::Quote,
                "Quote",
                RenderStrategy::Text(TextStyle::quote()),
                PaletteIcon::Quote,
            )
            .description("Call out a quotation.")
            .keywords(["blockquote", "citation"])
            .shortcut("> "),
            BlockSpec::new(
                BlockKind::Code,
                "Code",
                RenderStrategy::Text(TextStyle::code()),
                PaletteIcon::Code,
            )
            .description("Monospaced code snippet.")
            .keywords(["snippet", "pre", "monospace"])
            .shortcut("```"),
            BlockSpec::new(
                BlockKind::Image,
                "Image",
                RenderStrategy::Image,
                PaletteIcon::Image,
            )
            .description("Upload an image from disk.")
            .keywords(["picture", "photo", "upload"]),
        ];
        Self::new(specs).expect("standard block registry must be valid")
    }

    pub fn register(&mut self, spec: BlockSpec) -> Result<(), RegistryError> {
        if self.spec(spec.kind).is_some() {
            return Err(RegistryError::DuplicateKind(spec.kind));
        }
        if let Some(prefix) = spec.shortcut.as_deref() {
            if prefix.is_empty() || prefix.starts_with(PALETTE_TRIGGER) {
                return Err(RegistryError::ReservedShortcut(prefix.to_string()));
            }
            if self
                .specs
                .iter()
                .any(|existing| existing.shortcut.as_deref() == Some(prefix))
            {
                return Err(RegistryError::DuplicateShortcut(prefix.to_string()));
            }
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Specs in registration order, which is also palette order.
    pub fn specs(&self) -> &[BlockSpec] {
        &self.specs
    }

    pub fn spec(&self, kind: BlockKind) -> Option<&BlockSpec> {
        self.specs.iter().find(|spec| spec.kind == kind)
    }

    pub fn label(&self, kind: BlockKind) -> &str {
        self.spec(kind)
            .map(|spec| spec.label.as_str())
            .unwrap_or_else(|| kind.as_str())
    }

    /// Unregistered kinds fall back to plain body text.
    pub fn render_strategy(&self, kind: BlockKind) -> RenderStrategy {
        self.spec(kind)
            .map(|spec| spec.render)
            .unwrap_or(RenderStrategy::Text(TextStyle::body()))
    }

    pub fn is_text(&self, kind: BlockKind) -> bool {
        self.render_strategy(kind).is_text()
    }

    /// Find the registered shortcut prefix that `content` starts with. The longest prefix
    /// wins so `## ` is not read as `# `.
    pub fn match_shortcut(&self, content: &str) -> Option<ShortcutMatch> {
        self.specs
            .iter()
            .filter_map(|spec| {
                let prefix = spec.shortcut.as_deref()?;
                content.starts_with(prefix).then_some(ShortcutMatch {
                    kind: spec.kind,
                    prefix_len: prefix.len(),
                })
            })
            .max_by_key(|m| m.prefix_len)
    }

    pub fn filter(&self, query: &str) -> Vec<&BlockSpec> {
        self.specs.iter().filter(|spec| spec.matches(query)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = BlockRegistry::standard();
        for kind in BlockKind::ALL {
            assert!(registry.spec(kind).is_some(), "missing spec for {kind}");
        }
    }

    #[test]
    fn longest_shortcut_prefix_wins() {
        let registry = BlockRegistry::standard();
        let m = registry.match_shortcut("## Title").unwrap();
        assert_eq!(m.kind, BlockKind::Heading2);
        assert_eq!(m.prefix_len, 3);

        let m = registry.match_shortcut("### x").unwrap();
        assert_eq!(m.kind, BlockKind::Heading3);

        assert!(registry.match_shortcut("#no space").is_none());
    }

    #[test]
    fn register_rejects_duplicates_and_reserved_prefixes() {
        let mut registry = BlockRegistry::standard();
        let err = registry
            .register(BlockSpec::new(
                BlockKind::Quote,
                "Again",
                RenderStrategy::Text(TextStyle::quote()),
                PaletteIcon::Quote,
            ))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKind(BlockKind::Quote));

        let mut registry = BlockRegistry::default();
        let err = registry
            .register(
                BlockSpec::new(
                    BlockKind::Paragraph,
                    "Text",
                    RenderStrategy::Text(TextStyle::body()),
                    PaletteIcon::Text,
                )
                .shortcut("/p"),
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::ReservedShortcut("/p".into()));
    }

    #[test]
    fn filter_matches_labels_and_keywords() {
        let registry = BlockRegistry::standard();
        let kinds: Vec<BlockKind> = registry.filter("head").iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Heading1, BlockKind::Heading2, BlockKind::Heading3]
        );

        let kinds: Vec<BlockKind> = registry.filter("PHOTO").iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Image]);

        assert_eq!(registry.filter("").len(), registry.specs().len());
        assert!(registry.filter("zzz").is_empty());
    }
}
