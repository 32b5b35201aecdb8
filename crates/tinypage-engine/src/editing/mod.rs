/*!
 * # Editing Core
 *
 * The page model is an owned tree of blocks. Top-level blocks live in an
 * ordered sequence; sections and layouts own a second level of leaf blocks
 * and never another container.
 *
 * ## Module Structure
 *
 * - **`tree`**: `BlockTree`, `BlockPath` addressing and the structural verbs
 *   (create, attach, detach, insert below, move, duplicate, delete)
 * - **`selection`**: inline selections and the wrap/unwrap toggle
 * - **`commands`**: `Cmd`, the edit vocabulary the UI sends
 * - **`document`**: `Document`, which applies commands and notifies observers
 * - **`patch`**: result of one command
 *
 * ## Usage Pattern
 *
 * ```rust
 * use tinypage_engine::editing::*;
 * use tinypage_engine::models::{BlockType, InlineNode};
 *
 * let mut doc = Document::new();
 * let heading = create_block(
 *     NewBlock::new(BlockType::Heading)
 *         .level(2)
 *         .content(vec![InlineNode::text("Hello")]),
 * )
 * .unwrap();
 *
 * let patch = doc.apply(Cmd::InsertBelow {
 *     reference: BlockPath::Top(0),
 *     block: heading,
 * });
 * assert!(patch.changed);
 *
 * // Moving the first block up is a no-op.
 * let patch = doc.apply(Cmd::Move {
 *     path: BlockPath::Top(0),
 *     direction: Direction::Up,
 * });
 * assert!(!patch.changed);
 * ```
 *
 * Duplication goes through the serializer, so a copy never shares state
 * with its original.
 */

pub mod commands;
pub mod document;
pub mod patch;
pub mod selection;
pub mod tree;

pub use commands::Cmd;
pub use document::{Document, Observer};
pub use patch::Patch;
pub use selection::{InlineSelection, WrapOutcome, toggle_wrap};
pub use tree::{BlockPath, BlockTree, Direction, NewBlock, Position, TreeError, create_block};
