use crate::editing::selection::InlineSelection;
use crate::editing::tree::{BlockPath, Direction, Position};
use crate::models::{Block, InlineTag};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Add a block at the end of the page.
    Append {
        block: Block,
    },
    AttachChild {
        container: usize,
        block: Block,
        position: Position,
    },
    InsertBelow {
        reference: BlockPath,
        block: Block,
    },
    Move {
        path: BlockPath,
        direction: Direction,
    },
    Duplicate {
        path: BlockPath,
    },
    Delete {
        path: BlockPath,
    },
    ToggleInlineWrap {
        tag: InlineTag,
        selection: InlineSelection,
    },
    /// Only top-level blocks carry selectors; nested paths are ignored.
    SetSelector {
        path: BlockPath,
        selector: Option<String>,
    },
}
