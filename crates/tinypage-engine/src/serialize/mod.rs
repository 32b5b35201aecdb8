//! Conversion between the block tree and the compiler's plain records.
//!
//! `serialize` is total. `reconstruct` accepts anything that deserializes and
//! repairs it into a valid tree: nested containers are flattened into their
//! children, nested selectors are dropped, heading levels and layout columns
//! are clamped, and inline markup is sanitized.

pub mod record;

pub use record::{BlockRecord, ListItemRecord, PageSource, PageType, SerializedDocument};

use crate::models::block::DEFAULT_SPACER_HEIGHT;
use crate::models::inline::sanitize;
use crate::models::{
    AuthorInfo, Block, BlockKind, HeadingLevel, InlineNode, LayoutColumns, ListItem, ListVariant,
};

/// Text shown in a preview when the document has no blocks yet.
pub const PREVIEW_PLACEHOLDER: &str = "Start writing to see a preview.";

/// Converts a block, and any children, into its compiler record.
pub fn serialize(block: &Block) -> BlockRecord {
    let selector = block.selector().map(str::to_string);
    match &block.kind {
        BlockKind::Paragraph { content } => BlockRecord::Paragraph {
            children: content.clone(),
            selector,
        },
        BlockKind::Heading { level, content } => BlockRecord::Heading {
            level: level.get() as i64,
            children: content.clone(),
            selector,
        },
        BlockKind::Blockquote { content } => BlockRecord::Blockquote {
            children: content.clone(),
            selector,
        },
        BlockKind::Codeblock { code } => BlockRecord::Codeblock {
            content: code.clone(),
            selector,
        },
        BlockKind::List { variant, items } => {
            let items = items
                .iter()
                .map(|item| ListItemRecord {
                    children: item.content.clone(),
                })
                .collect();
            match variant {
                ListVariant::Ordered => BlockRecord::OrderedList { items, selector },
                ListVariant::Unordered => BlockRecord::UnorderedList { items, selector },
            }
        }
        BlockKind::Divider => BlockRecord::Divider { selector },
        BlockKind::Spacer { height } => BlockRecord::Spacer {
            height: height.clone(),
            selector,
        },
        BlockKind::Bloglist => BlockRecord::Bloglist { selector },
        BlockKind::Author(info) => BlockRecord::Author {
            show_published: info.show_published,
            show_modified: info.show_modified,
            show_author: info.show_author,
            tags: info.tags().to_vec(),
            children: info.content.clone(),
            selector,
        },
        BlockKind::Section { children } => BlockRecord::Section {
            children: children.iter().map(serialize).collect(),
            selector,
        },
        BlockKind::Layout { columns, children } => BlockRecord::Layout {
            columns: columns.get() as i64,
            children: children.iter().map(serialize).collect(),
            selector,
        },
    }
}

/// Serializes a sequence of top-level blocks in order.
pub fn serialize_all<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Vec<BlockRecord> {
    blocks.into_iter().map(serialize).collect()
}

/// Rebuilds a top-level block from its record.
pub fn reconstruct(record: BlockRecord) -> Block {
    let selector = record.selector().map(str::to_string);
    let mut block = Block::new(record_kind(record));
    block.set_selector(selector.as_deref());
    block
}

/// Rebuilds the blocks a record contributes when it sits inside a container.
///
/// A leaf yields one block without its selector. A nested container is
/// flattened: it yields its own children, recursively.
pub fn reconstruct_nested(record: BlockRecord) -> Vec<Block> {
    match record {
        BlockRecord::Section { children, .. } | BlockRecord::Layout { children, .. } => {
            log::warn!("flattening a container nested inside another container");
            reconstruct_children(children)
        }
        leaf => {
            if leaf.selector().is_some() {
                log::debug!("dropping selector of nested {} block", leaf.type_name());
            }
            vec![Block::new(record_kind(leaf))]
        }
    }
}

/// Rebuilds a whole top-level sequence.
pub fn reconstruct_all(records: impl IntoIterator<Item = BlockRecord>) -> Vec<Block> {
    records.into_iter().map(reconstruct).collect()
}

fn reconstruct_children(records: Vec<BlockRecord>) -> Vec<Block> {
    records.into_iter().flat_map(reconstruct_nested).collect()
}

fn record_kind(record: BlockRecord) -> BlockKind {
    match record {
        BlockRecord::Paragraph { children, .. } => BlockKind::Paragraph {
            content: sanitize(children),
        },
        BlockRecord::Heading {
            level, children, ..
        } => BlockKind::Heading {
            level: HeadingLevel::clamped(level),
            content: sanitize(children),
        },
        BlockRecord::Blockquote { children, .. } => BlockKind::Blockquote {
            content: sanitize(children),
        },
        BlockRecord::Codeblock { content, .. } => BlockKind::Codeblock { code: content },
        BlockRecord::UnorderedList { items, .. } => list_kind(ListVariant::Unordered, items),
        BlockRecord::OrderedList { items, .. } => list_kind(ListVariant::Ordered, items),
        BlockRecord::Divider { .. } => BlockKind::Divider,
        BlockRecord::Spacer { height, .. } => {
            let height = height.trim();
            BlockKind::Spacer {
                height: if height.is_empty() {
                    DEFAULT_SPACER_HEIGHT.to_string()
                } else {
                    height.to_string()
                },
            }
        }
        BlockRecord::Bloglist { .. } => BlockKind::Bloglist,
        BlockRecord::Author {
            show_published,
            show_modified,
            show_author,
            tags,
            children,
            ..
        } => {
            let mut info = AuthorInfo::default()
                .with_content(sanitize(children))
                .with_tags(tags);
            info.show_published = show_published;
            info.show_modified = show_modified;
            info.show_author = show_author;
            BlockKind::Author(info)
        }
        BlockRecord::Section { children, .. } => BlockKind::Section {
            children: reconstruct_children(children),
        },
        BlockRecord::Layout {
            columns, children, ..
        } => BlockKind::Layout {
            columns: LayoutColumns::clamped(columns),
            children: reconstruct_children(children),
        },
    }
}

fn list_kind(variant: ListVariant, items: Vec<ListItemRecord>) -> BlockKind {
    let mut items: Vec<ListItem> = items
        .into_iter()
        .map(|item| ListItem {
            content: sanitize(item.children),
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::default());
    }
    BlockKind::List { variant, items }
}

/// Content shown by a preview: the document's records, or a single
/// placeholder paragraph when there are none.
pub fn preview_content(records: &[BlockRecord]) -> Vec<BlockRecord> {
    if records.is_empty() {
        vec![BlockRecord::Paragraph {
            children: vec![InlineNode::text(PREVIEW_PLACEHOLDER)],
            selector: None,
        }]
    } else {
        records.to_vec()
    }
}
