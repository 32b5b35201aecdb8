use crate::models::inline::InlineNode;

/// Default height of a freshly created spacer.
pub const DEFAULT_SPACER_HEIGHT: &str = "1rem";
/// Default column count of a layout block.
pub const DEFAULT_LAYOUT_COLUMNS: u8 = 2;
/// Widest grid a layout block may request.
pub const MAX_LAYOUT_COLUMNS: u8 = 6;
/// Author blocks keep at most this many tags.
pub const MAX_AUTHOR_TAGS: usize = 8;
/// Each author tag is truncated to this many characters.
pub const MAX_AUTHOR_TAG_CHARS: usize = 32;

/// The closed set of block kinds, without their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Heading,
    Blockquote,
    Codeblock,
    List,
    Divider,
    Spacer,
    Bloglist,
    Author,
    Section,
    Layout,
}

impl BlockType {
    /// Only sections and layouts own child blocks.
    pub fn is_container(self) -> bool {
        matches!(self, BlockType::Section | BlockType::Layout)
    }

    /// Kinds that may be added inside a container.
    pub const NESTABLE: [BlockType; 9] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::Blockquote,
        BlockType::Codeblock,
        BlockType::List,
        BlockType::Divider,
        BlockType::Spacer,
        BlockType::Bloglist,
        BlockType::Author,
    ];
}

/// Heading level, always within 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Forces an arbitrary stored level into range.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// Layout column count, always within 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutColumns(u8);

impl LayoutColumns {
    pub fn new(columns: u8) -> Option<Self> {
        (1..=MAX_LAYOUT_COLUMNS)
            .contains(&columns)
            .then_some(Self(columns))
    }

    /// Non-positive counts fall back to the default; large ones are capped.
    pub fn clamped(columns: i64) -> Self {
        if columns < 1 {
            Self::default()
        } else {
            Self(columns.min(MAX_LAYOUT_COLUMNS as i64) as u8)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for LayoutColumns {
    fn default() -> Self {
        Self(DEFAULT_LAYOUT_COLUMNS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListVariant {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub content: Vec<InlineNode>,
}

/// Byline block settings.
///
/// Tags are only reachable through [`AuthorInfo::set_tags`], which keeps them
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInfo {
    pub content: Vec<InlineNode>,
    pub show_published: bool,
    pub show_modified: bool,
    pub show_author: bool,
    tags: Vec<String>,
}

impl AuthorInfo {
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_tags(tags);
        self
    }

    pub fn with_content(mut self, content: Vec<InlineNode>) -> Self {
        self.content = content;
        self
    }
}

impl Default for AuthorInfo {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            show_published: true,
            show_modified: true,
            show_author: true,
            tags: Vec::new(),
        }
    }
}

/// Trims, deduplicates and bounds a tag list.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag: String = tag.as_ref().trim().chars().take(MAX_AUTHOR_TAG_CHARS).collect();
        let tag = tag.trim_end();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
        if out.len() == MAX_AUTHOR_TAGS {
            break;
        }
    }
    out
}

/// Kind-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph {
        content: Vec<InlineNode>,
    },
    Heading {
        level: HeadingLevel,
        content: Vec<InlineNode>,
    },
    Blockquote {
        content: Vec<InlineNode>,
    },
    /// Code is kept verbatim and never formatted.
    Codeblock {
        code: String,
    },
    List {
        variant: ListVariant,
        items: Vec<ListItem>,
    },
    Divider,
    Spacer {
        height: String,
    },
    Bloglist,
    Author(AuthorInfo),
    Section {
        children: Vec<Block>,
    },
    Layout {
        columns: LayoutColumns,
        children: Vec<Block>,
    },
}

/// A node of the document tree.
///
/// Blocks have no identity of their own: two blocks are the same if they are
/// structurally equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    selector: Option<String>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            selector: None,
        }
    }

    pub fn paragraph(content: Vec<InlineNode>) -> Self {
        Self::new(BlockKind::Paragraph { content })
    }

    pub fn heading(level: HeadingLevel, content: Vec<InlineNode>) -> Self {
        Self::new(BlockKind::Heading { level, content })
    }

    pub fn section(children: Vec<Block>) -> Self {
        Self::new(BlockKind::Section { children })
    }

    pub fn layout(columns: LayoutColumns, children: Vec<Block>) -> Self {
        Self::new(BlockKind::Layout { columns, children })
    }

    pub fn block_type(&self) -> BlockType {
        match &self.kind {
            BlockKind::Paragraph { .. } => BlockType::Paragraph,
            BlockKind::Heading { .. } => BlockType::Heading,
            BlockKind::Blockquote { .. } => BlockType::Blockquote,
            BlockKind::Codeblock { .. } => BlockType::Codeblock,
            BlockKind::List { .. } => BlockType::List,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Spacer { .. } => BlockType::Spacer,
            BlockKind::Bloglist => BlockType::Bloglist,
            BlockKind::Author(_) => BlockType::Author,
            BlockKind::Section { .. } => BlockType::Section,
            BlockKind::Layout { .. } => BlockType::Layout,
        }
    }

    pub fn is_container(&self) -> bool {
        self.block_type().is_container()
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Sets the styling selector; blank input clears it.
    pub fn set_selector(&mut self, selector: Option<&str>) {
        self.selector = selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.set_selector(Some(selector));
        self
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match &self.kind {
            BlockKind::Section { children } | BlockKind::Layout { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.kind {
            BlockKind::Section { children } | BlockKind::Layout { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Inline markup that formatting tools may edit.
    ///
    /// Lists expose one sequence per item, selected by `item`.
    pub fn inline_content_mut(&mut self, item: Option<usize>) -> Option<&mut Vec<InlineNode>> {
        match (&mut self.kind, item) {
            (BlockKind::Paragraph { content }, None)
            | (BlockKind::Heading { content, .. }, None)
            | (BlockKind::Blockquote { content }, None)
            | (BlockKind::Author(AuthorInfo { content, .. }), None) => Some(content),
            (BlockKind::List { items, .. }, Some(index)) => {
                items.get_mut(index).map(|item| &mut item.content)
            }
            _ => None,
        }
    }
}
