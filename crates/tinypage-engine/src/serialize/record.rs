use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::InlineNode;

fn default_heading_level() -> i64 {
    1
}

fn default_spacer_height() -> String {
    crate::models::block::DEFAULT_SPACER_HEIGHT.to_string()
}

fn default_layout_columns() -> i64 {
    crate::models::block::DEFAULT_LAYOUT_COLUMNS as i64
}

fn default_true() -> bool {
    true
}

/// One list item in the compiler's format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ListItemRecord {
    #[serde(default)]
    pub children: Vec<InlineNode>,
}

/// A block in the compiler's plain input representation.
///
/// Records may come from hand-edited or stored sources, so numeric fields are
/// kept wide here and brought into range by
/// [`reconstruct`](crate::serialize::reconstruct).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockRecord {
    Paragraph {
        #[serde(default)]
        children: Vec<InlineNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Heading {
        #[serde(default = "default_heading_level")]
        level: i64,
        #[serde(default)]
        children: Vec<InlineNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Blockquote {
        #[serde(default)]
        children: Vec<InlineNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Codeblock {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    UnorderedList {
        #[serde(default)]
        items: Vec<ListItemRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    OrderedList {
        #[serde(default)]
        items: Vec<ListItemRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Divider {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Spacer {
        #[serde(default = "default_spacer_height")]
        height: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Bloglist {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Author {
        #[serde(rename = "showPublished", default = "default_true")]
        show_published: bool,
        #[serde(rename = "showModified", default = "default_true")]
        show_modified: bool,
        #[serde(rename = "showAuthor", default = "default_true")]
        show_author: bool,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        children: Vec<InlineNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Section {
        #[serde(default)]
        children: Vec<BlockRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Layout {
        #[serde(default = "default_layout_columns")]
        columns: i64,
        #[serde(default)]
        children: Vec<BlockRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
}

impl BlockRecord {
    /// The `type` tag as written on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockRecord::Paragraph { .. } => "paragraph",
            BlockRecord::Heading { .. } => "heading",
            BlockRecord::Blockquote { .. } => "blockquote",
            BlockRecord::Codeblock { .. } => "codeblock",
            BlockRecord::UnorderedList { .. } => "unordered-list",
            BlockRecord::OrderedList { .. } => "ordered-list",
            BlockRecord::Divider { .. } => "divider",
            BlockRecord::Spacer { .. } => "spacer",
            BlockRecord::Bloglist { .. } => "bloglist",
            BlockRecord::Author { .. } => "author",
            BlockRecord::Section { .. } => "section",
            BlockRecord::Layout { .. } => "layout",
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            BlockRecord::Paragraph { selector, .. }
            | BlockRecord::Heading { selector, .. }
            | BlockRecord::Blockquote { selector, .. }
            | BlockRecord::Codeblock { selector, .. }
            | BlockRecord::UnorderedList { selector, .. }
            | BlockRecord::OrderedList { selector, .. }
            | BlockRecord::Divider { selector }
            | BlockRecord::Spacer { selector, .. }
            | BlockRecord::Bloglist { selector }
            | BlockRecord::Author { selector, .. }
            | BlockRecord::Section { selector, .. }
            | BlockRecord::Layout { selector, .. } => selector.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Post,
    Page,
}

/// A page source as stored between editing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSource {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page_type: PageType,
    #[serde(default)]
    pub content: Vec<BlockRecord>,
}

/// Input handed to the measurement and publish collaborators.
///
/// `allow_pagination` travels next to the content, never inside a block
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDocument {
    pub slug: String,
    pub title: String,
    pub page_type: PageType,
    pub build_id: Uuid,
    pub content: Vec<BlockRecord>,
    pub allow_pagination: bool,
}

impl SerializedDocument {
    /// Slug with the compiler's fallback for blank input.
    pub fn effective_slug(&self) -> &str {
        let slug = self.slug.trim();
        if slug.is_empty() { "untitled" } else { slug }
    }
}
