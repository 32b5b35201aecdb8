use crate::models::block::DEFAULT_SPACER_HEIGHT;
use crate::models::inline::plain_text;
use crate::models::{
    AuthorInfo, Block, BlockKind, BlockType, HeadingLevel, InlineNode, LayoutColumns, ListItem,
    ListVariant,
};
use crate::serialize::{reconstruct, reconstruct_nested, serialize};

/// Address of a block in the tree.
///
/// Containers only hold leaves, so two levels are enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockPath {
    Top(usize),
    Child { parent: usize, index: usize },
}

impl BlockPath {
    /// Position within the block's own sibling sequence.
    pub fn index(self) -> usize {
        match self {
            BlockPath::Top(index) | BlockPath::Child { index, .. } => index,
        }
    }

    /// Same sibling sequence, different position.
    pub fn with_index(self, index: usize) -> Self {
        match self {
            BlockPath::Top(_) => BlockPath::Top(index),
            BlockPath::Child { parent, .. } => BlockPath::Child { parent, index },
        }
    }

    pub fn is_nested(self) -> bool {
        matches!(self, BlockPath::Child { .. })
    }
}

/// Where `attach_child` places the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Append,
    /// Index into the children; past the end appends.
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Maps the editor's `-1` / `+1` move offsets.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        }
    }

    fn target(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => (index + 1 < len).then_some(index + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("{0:?} blocks cannot be placed inside a section or layout")]
    NestedContainer(BlockType),
    #[error("block at {0:?} is not a section or layout")]
    NotAContainer(BlockPath),
}

/// Arguments of [`create_block`]; everything but the kind is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub kind: BlockType,
    pub level: Option<u8>,
    pub content: Vec<InlineNode>,
    pub list_variant: Option<ListVariant>,
    pub spacer_height: Option<String>,
    pub nested: bool,
}

impl NewBlock {
    pub fn new(kind: BlockType) -> Self {
        Self {
            kind,
            level: None,
            content: Vec::new(),
            list_variant: None,
            spacer_height: None,
            nested: false,
        }
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    pub fn content(mut self, content: Vec<InlineNode>) -> Self {
        self.content = content;
        self
    }

    pub fn list_variant(mut self, variant: ListVariant) -> Self {
        self.list_variant = Some(variant);
        self
    }

    pub fn spacer_height(mut self, height: impl Into<String>) -> Self {
        self.spacer_height = Some(height.into());
        self
    }

    /// Marks the block as created from a container's "add inner block" path.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }
}

/// Builds a detached block with kind defaults filled in.
pub fn create_block(new: NewBlock) -> Result<Block, TreeError> {
    if new.nested && new.kind.is_container() {
        return Err(TreeError::NestedContainer(new.kind));
    }
    let kind = match new.kind {
        BlockType::Paragraph => BlockKind::Paragraph {
            content: new.content,
        },
        BlockType::Heading => BlockKind::Heading {
            level: new
                .level
                .map(|l| HeadingLevel::clamped(l as i64))
                .unwrap_or_default(),
            content: new.content,
        },
        BlockType::Blockquote => BlockKind::Blockquote {
            content: new.content,
        },
        BlockType::Codeblock => BlockKind::Codeblock {
            code: plain_text(&new.content),
        },
        BlockType::List => BlockKind::List {
            variant: new.list_variant.unwrap_or_default(),
            items: vec![ListItem {
                content: new.content,
            }],
        },
        BlockType::Divider => BlockKind::Divider,
        BlockType::Spacer => BlockKind::Spacer {
            height: new
                .spacer_height
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SPACER_HEIGHT.to_string()),
        },
        BlockType::Bloglist => BlockKind::Bloglist,
        BlockType::Author => BlockKind::Author(AuthorInfo::default().with_content(new.content)),
        BlockType::Section => BlockKind::Section {
            children: Vec::new(),
        },
        BlockType::Layout => BlockKind::Layout {
            columns: LayoutColumns::default(),
            children: Vec::new(),
        },
    };
    Ok(Block::new(kind))
}

/// Prepares a block for life inside a container.
fn into_nested(mut block: Block) -> Result<Block, TreeError> {
    if block.is_container() {
        return Err(TreeError::NestedContainer(block.block_type()));
    }
    block.set_selector(None);
    Ok(block)
}

/// Prepares a block for the top-level sequence.
///
/// A container holding another container or a styled child is sent through
/// the serializer, which flattens the one and strips the other.
fn into_top_level(block: Block) -> Block {
    let illegal = block.children().is_some_and(|children| {
        children
            .iter()
            .any(|child| child.is_container() || child.selector().is_some())
    });
    if illegal {
        log::warn!("repairing nesting of a {:?} block", block.block_type());
        reconstruct(serialize(&block))
    } else {
        block
    }
}

/// The ordered top-level sequence of a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockTree {
    blocks: Vec<Block>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from top-level blocks, repairing illegal nesting.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let blocks = blocks.into_iter().map(into_top_level).collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, path: BlockPath) -> Option<&Block> {
        match path {
            BlockPath::Top(index) => self.blocks.get(index),
            BlockPath::Child { parent, index } => self.blocks.get(parent)?.children()?.get(index),
        }
    }

    pub fn get_mut(&mut self, path: BlockPath) -> Option<&mut Block> {
        match path {
            BlockPath::Top(index) => self.blocks.get_mut(index),
            BlockPath::Child { parent, index } => {
                self.blocks.get_mut(parent)?.children_mut()?.get_mut(index)
            }
        }
    }

    /// The sibling sequence `path` nominally lives in.
    fn sequence_mut(&mut self, path: BlockPath) -> Option<&mut Vec<Block>> {
        match path {
            BlockPath::Top(_) => Some(&mut self.blocks),
            BlockPath::Child { parent, .. } => self.blocks.get_mut(parent)?.children_mut(),
        }
    }

    /// Appends a top-level block.
    pub fn push(&mut self, block: Block) -> BlockPath {
        self.blocks.push(into_top_level(block));
        BlockPath::Top(self.blocks.len() - 1)
    }

    pub fn attach_child(
        &mut self,
        container: usize,
        block: Block,
        position: Position,
    ) -> Result<BlockPath, TreeError> {
        let not_a_container = TreeError::NotAContainer(BlockPath::Top(container));
        let children = self
            .blocks
            .get_mut(container)
            .ok_or_else(|| not_a_container.clone())?
            .children_mut()
            .ok_or(not_a_container)?;
        let block = into_nested(block)?;
        let index = match position {
            Position::Append => children.len(),
            Position::Index(index) => index.min(children.len()),
        };
        children.insert(index, block);
        log::debug!("attached child {index} to container {container}");
        Ok(BlockPath::Child {
            parent: container,
            index,
        })
    }

    /// Removes and returns the block at `path`.
    pub fn detach(&mut self, path: BlockPath) -> Option<Block> {
        let index = path.index();
        let sequence = self.sequence_mut(path)?;
        if index >= sequence.len() {
            return None;
        }
        log::debug!("detached block at {path:?}");
        Some(sequence.remove(index))
    }

    /// Inserts `block` right after `reference` and returns its new path.
    ///
    /// A reference past the end of its sequence appends to that sequence.
    /// Returns `None` when the nominal parent does not exist or the block may
    /// not live there.
    pub fn insert_below(&mut self, reference: BlockPath, block: Block) -> Option<BlockPath> {
        let block = if reference.is_nested() {
            match into_nested(block) {
                Ok(block) => block,
                Err(err) => {
                    log::warn!("insert below {reference:?} refused: {err}");
                    return None;
                }
            }
        } else {
            into_top_level(block)
        };
        let sequence = self.sequence_mut(reference)?;
        let index = (reference.index() + 1).min(sequence.len());
        sequence.insert(index, block);
        log::debug!("inserted block below {reference:?}");
        Some(reference.with_index(index))
    }

    /// Swaps the block with its neighbour. Returns the new path, or `None`
    /// when nothing moved.
    pub fn move_block(&mut self, path: BlockPath, direction: Direction) -> Option<BlockPath> {
        let index = path.index();
        let sequence = self.sequence_mut(path)?;
        if index >= sequence.len() {
            return None;
        }
        let target = direction.target(index, sequence.len())?;
        sequence.swap(index, target);
        log::debug!("moved block {path:?} {direction:?}");
        Some(path.with_index(target))
    }

    /// Copies a block through the serializer and inserts the copy below it.
    pub fn duplicate(&mut self, path: BlockPath) -> Option<BlockPath> {
        let record = serialize(self.get(path)?);
        let copy = if path.is_nested() {
            reconstruct_nested(record).into_iter().next()?
        } else {
            reconstruct(record)
        };
        self.insert_below(path, copy)
    }

    /// Removes the block and everything under it.
    pub fn delete(&mut self, path: BlockPath) -> bool {
        self.detach(path).is_some()
    }
}

impl From<Vec<Block>> for BlockTree {
    fn from(blocks: Vec<Block>) -> Self {
        Self::from_blocks(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn para(text: &str) -> Block {
        Block::paragraph(vec![InlineNode::text(text)])
    }

    fn tree() -> BlockTree {
        BlockTree::from_blocks(vec![
            para("a"),
            Block::section(vec![para("s1"), para("s2")]),
            para("b"),
        ])
    }

    #[test]
    fn create_block_fills_defaults() {
        let heading = create_block(NewBlock::new(BlockType::Heading).level(9)).unwrap();
        assert_eq!(
            heading.kind,
            BlockKind::Heading {
                level: HeadingLevel::new(6).unwrap(),
                content: vec![]
            }
        );

        let list = create_block(NewBlock::new(BlockType::List)).unwrap();
        assert!(matches!(
            list.kind,
            BlockKind::List { variant: ListVariant::Unordered, ref items } if items.len() == 1
        ));

        let spacer = create_block(NewBlock::new(BlockType::Spacer)).unwrap();
        assert_eq!(
            spacer.kind,
            BlockKind::Spacer {
                height: "1rem".to_string()
            }
        );
    }

    #[rstest]
    #[case(BlockType::Section)]
    #[case(BlockType::Layout)]
    fn nested_container_is_rejected(#[case] kind: BlockType) {
        assert_eq!(
            create_block(NewBlock::new(kind).nested()),
            Err(TreeError::NestedContainer(kind))
        );
    }

    #[test]
    fn attach_child_rejects_non_container() {
        let mut tree = tree();
        assert_eq!(
            tree.attach_child(0, para("x"), Position::Append),
            Err(TreeError::NotAContainer(BlockPath::Top(0)))
        );
        assert_eq!(
            tree.attach_child(1, Block::section(vec![]), Position::Append),
            Err(TreeError::NestedContainer(BlockType::Section))
        );
    }

    #[test]
    fn attach_child_strips_selector_and_clamps_index() {
        let mut tree = tree();
        let path = tree
            .attach_child(1, para("x").with_selector("#x"), Position::Index(99))
            .unwrap();
        assert_eq!(path, BlockPath::Child { parent: 1, index: 2 });
        assert_eq!(tree.get(path).unwrap().selector(), None);
    }

    #[test]
    fn detach_missing_block_is_silent() {
        let mut tree = tree();
        assert_eq!(tree.detach(BlockPath::Top(7)), None);
        assert_eq!(tree.detach(BlockPath::Child { parent: 0, index: 0 }), None);
        assert_eq!(tree, self::tree());
    }

    #[test]
    fn insert_below_nested_reference_stays_in_container() {
        let mut tree = tree();
        let path = tree
            .insert_below(BlockPath::Child { parent: 1, index: 0 }, para("new"))
            .unwrap();
        assert_eq!(path, BlockPath::Child { parent: 1, index: 1 });
        let children = tree.get(BlockPath::Top(1)).unwrap().children().unwrap();
        assert_eq!(children, &vec![para("s1"), para("new"), para("s2")]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn insert_below_missing_reference_appends_to_nominal_parent() {
        let mut tree = tree();
        let path = tree.insert_below(BlockPath::Top(42), para("end")).unwrap();
        assert_eq!(path, BlockPath::Top(3));

        let path = tree
            .insert_below(BlockPath::Child { parent: 1, index: 9 }, para("tail"))
            .unwrap();
        assert_eq!(path, BlockPath::Child { parent: 1, index: 2 });
    }

    #[test]
    fn insert_below_without_parent_is_noop() {
        let mut tree = tree();
        assert_eq!(
            tree.insert_below(BlockPath::Child { parent: 0, index: 0 }, para("x")),
            None
        );
        assert_eq!(
            tree.insert_below(BlockPath::Child { parent: 1, index: 0 }, Block::section(vec![])),
            None
        );
        assert_eq!(tree, self::tree());
    }

    #[rstest]
    #[case(BlockPath::Top(0), Direction::Up)]
    #[case(BlockPath::Top(2), Direction::Down)]
    #[case(BlockPath::Child { parent: 1, index: 0 }, Direction::Up)]
    #[case(BlockPath::Child { parent: 1, index: 1 }, Direction::Down)]
    #[case(BlockPath::Top(5), Direction::Up)]
    fn out_of_range_move_is_noop(#[case] path: BlockPath, #[case] direction: Direction) {
        let mut tree = tree();
        assert_eq!(tree.move_block(path, direction), None);
        assert_eq!(tree, self::tree());
    }

    #[test]
    fn move_never_leaves_the_container() {
        let mut tree = tree();
        let path = tree
            .move_block(BlockPath::Child { parent: 1, index: 1 }, Direction::Up)
            .unwrap();
        assert_eq!(path, BlockPath::Child { parent: 1, index: 0 });
        assert_eq!(
            tree.get(BlockPath::Top(1)).unwrap().children().unwrap(),
            &vec![para("s2"), para("s1")]
        );
        assert_eq!(tree.blocks()[0], para("a"));
    }

    #[test]
    fn duplicate_is_independent_of_original() {
        let mut tree = tree();
        let copy = tree.duplicate(BlockPath::Top(1)).unwrap();
        assert_eq!(copy, BlockPath::Top(2));
        assert_eq!(tree.get(copy), tree.get(BlockPath::Top(1)));

        tree.move_block(BlockPath::Child { parent: 2, index: 0 }, Direction::Down)
            .unwrap();
        assert!(tree.delete(BlockPath::Child { parent: 2, index: 0 }));
        assert_eq!(
            tree.get(BlockPath::Top(1)).unwrap().children().unwrap(),
            &vec![para("s1"), para("s2")]
        );
    }

    #[test]
    fn delete_drops_container_with_children() {
        let mut tree = tree();
        assert!(tree.delete(BlockPath::Top(1)));
        assert_eq!(tree.blocks(), &[para("a"), para("b")]);
        assert!(!tree.delete(BlockPath::Top(5)));
    }

    fn badly_nested() -> Block {
        Block::section(vec![
            Block::section(vec![para("deep")]),
            para("styled").with_selector("#n"),
        ])
    }

    #[test]
    fn push_repairs_illegal_nesting() {
        let mut tree = BlockTree::new();
        let path = tree.push(badly_nested());
        assert_eq!(
            tree.get(path),
            Some(&Block::section(vec![para("deep"), para("styled")]))
        );
    }

    #[test]
    fn insert_below_top_level_repairs_illegal_nesting() {
        let mut tree = tree();
        let path = tree.insert_below(BlockPath::Top(0), badly_nested()).unwrap();
        let children = tree.get(path).unwrap().children().unwrap();
        assert!(children.iter().all(|c| !c.is_container() && c.selector().is_none()));

        let copy = tree.duplicate(path).unwrap();
        assert_eq!(tree.get(copy), tree.get(path));
    }

    #[rstest]
    #[case(-1, Some(Direction::Up))]
    #[case(1, Some(Direction::Down))]
    #[case(0, None)]
    #[case(2, None)]
    fn direction_from_offset(#[case] offset: i32, #[case] expected: Option<Direction>) {
        assert_eq!(Direction::from_offset(offset), expected);
    }

    #[test]
    fn from_blocks_repairs_illegal_nesting() {
        let tree = BlockTree::from_blocks(vec![Block::section(vec![
            Block::section(vec![para("deep").with_selector("#d")]),
            para("x"),
        ])]);
        assert_eq!(
            tree.blocks(),
            &[Block::section(vec![para("deep"), para("x")])]
        );
    }
}
