use std::fmt;

use uuid::Uuid;

use crate::editing::selection::{WrapOutcome, toggle_wrap};
use crate::editing::tree::{BlockPath, BlockTree};
use crate::editing::{Cmd, Patch};
use crate::models::Block;
use crate::serialize::{
    PageSource, PageType, SerializedDocument, preview_content, reconstruct_all, serialize_all,
};

/// Callback invoked after every command that changed the document.
pub type Observer = Box<dyn FnMut(&Patch)>;

/// A page being edited: metadata plus the block tree.
///
/// All structural edits go through [`Document::apply`], which bumps the
/// version and notifies observers when, and only when, something changed.
pub struct Document {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) page_type: PageType,
    pub(crate) tree: BlockTree,
    pub(crate) version: u64,
    observers: Vec<Observer>,
}

impl Document {
    /// A blank page with a single empty paragraph, as the editor starts.
    pub fn new() -> Self {
        Self::with_tree(String::new(), BlockTree::from_blocks(vec![Block::paragraph(vec![])]))
    }

    pub fn with_tree(title: impl Into<String>, tree: BlockTree) -> Self {
        Self {
            title: title.into(),
            slug: String::new(),
            page_type: PageType::default(),
            tree,
            version: 0,
            observers: Vec::new(),
        }
    }

    /// Loads a stored source, repairing whatever the records contain.
    pub fn from_source(source: PageSource) -> Self {
        let tree = BlockTree::from_blocks(reconstruct_all(source.content));
        let mut doc = Self::with_tree(source.title, tree);
        doc.slug = source.slug;
        doc.page_type = source.page_type;
        doc
    }

    pub fn to_source(&self) -> PageSource {
        PageSource {
            slug: self.slug.clone(),
            title: self.title.clone(),
            page_type: self.page_type,
            content: serialize_all(self.tree.blocks()),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn set_page_type(&mut self, page_type: PageType) {
        self.page_type = page_type;
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers a change observer.
    pub fn subscribe(&mut self, observer: impl FnMut(&Patch) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply command to document
    ///
    /// No-op commands (out-of-range moves, failed wraps, missing paths) leave
    /// the version alone and do not reach observers.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let (changed, focus) = match cmd {
            Cmd::Append { block } => (true, Some(self.tree.push(block))),
            Cmd::AttachChild {
                container,
                block,
                position,
            } => match self.tree.attach_child(container, block, position) {
                Ok(path) => (true, Some(path)),
                Err(err) => {
                    log::warn!("cannot attach child: {err}");
                    (false, None)
                }
            },
            Cmd::InsertBelow { reference, block } => {
                let path = self.tree.insert_below(reference, block);
                (path.is_some(), path)
            }
            Cmd::Move { path, direction } => {
                let path = self.tree.move_block(path, direction);
                (path.is_some(), path)
            }
            Cmd::Duplicate { path } => {
                let path = self.tree.duplicate(path);
                (path.is_some(), path)
            }
            Cmd::Delete { path } => (self.tree.delete(path), None),
            Cmd::ToggleInlineWrap { tag, selection } => {
                let outcome = if selection.is_collapsed() {
                    WrapOutcome::Collapsed
                } else {
                    let (start, end) = selection.ordered();
                    match self
                        .tree
                        .get_mut(selection.block)
                        .and_then(|block| block.inline_content_mut(selection.item))
                    {
                        Some(nodes) => toggle_wrap(nodes, tag, start, end),
                        None => WrapOutcome::Failed,
                    }
                };
                if outcome == WrapOutcome::Failed {
                    log::warn!("could not apply {tag:?} to {selection:?}");
                }
                (outcome.changed(), Some(selection.block))
            }
            Cmd::SetSelector { path, selector } => match (path, self.tree.get_mut(path)) {
                (BlockPath::Top(_), Some(block)) => {
                    let before = block.selector().map(str::to_string);
                    block.set_selector(selector.as_deref());
                    (block.selector() != before.as_deref(), Some(path))
                }
                _ => (false, None),
            },
        };
        self.finish(changed, focus)
    }

    /// Clears the page back to the state of [`Document::new`].
    pub fn reset(&mut self) -> Patch {
        self.title.clear();
        self.slug.clear();
        self.page_type = PageType::default();
        self.tree = BlockTree::from_blocks(vec![Block::paragraph(vec![])]);
        self.finish(true, Some(BlockPath::Top(0)))
    }

    fn finish(&mut self, changed: bool, focus: Option<BlockPath>) -> Patch {
        if changed {
            self.version += 1;
        }
        let patch = Patch {
            changed,
            focus: focus.filter(|_| changed),
            version: self.version,
        };
        if changed {
            log::debug!("document changed, version {}", self.version);
            for observer in &mut self.observers {
                observer(&patch);
            }
        }
        patch
    }

    /// The envelope handed to the measurement and publish collaborators.
    pub fn to_serialized(&self, allow_pagination: bool, build_id: Uuid) -> SerializedDocument {
        SerializedDocument {
            slug: self.slug.clone(),
            title: self.title.clone(),
            page_type: self.page_type,
            build_id,
            content: serialize_all(self.tree.blocks()),
            allow_pagination,
        }
    }

    /// Like [`Document::to_serialized`], with a placeholder paragraph when
    /// the page has no blocks.
    pub fn preview(&self) -> SerializedDocument {
        let mut doc = self.to_serialized(false, Uuid::new_v4());
        doc.content = preview_content(&doc.content);
        doc
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title)
            .field("slug", &self.slug)
            .field("page_type", &self.page_type)
            .field("tree", &self.tree)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
