pub mod editing;
pub mod estimate;
pub mod io;
pub mod models;
pub mod publish;
pub mod serialize;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{
    BlockPath, BlockTree, Cmd, Direction, Document, InlineSelection, NewBlock, Patch, Position,
    TreeError, create_block,
};
pub use io::*;
pub use models::{Block, BlockKind, BlockType, InlineNode, InlineTag, PageFile};
pub use publish::{Decision, PublishAbort, PublishError, PublishOutcome, PublishWorkflow};
