pub mod block;
pub mod inline;
pub mod page_file;

pub use block::{
    AuthorInfo, Block, BlockKind, BlockType, HeadingLevel, LayoutColumns, ListItem, ListVariant,
    normalize_tags,
};
pub use inline::{InlineNode, InlineTag, LinkTarget};
pub use page_file::PageFile;
