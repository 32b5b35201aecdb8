use crate::editing::tree::BlockPath;
use crate::models::InlineNode;
use crate::models::InlineTag;
use crate::models::inline::{char_len, merge_adjacent_text};

/// A character range inside one text-bearing block.
///
/// `item` picks the list item when the block is a list. Offsets count
/// characters of the block's plain text, a linebreak being one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSelection {
    pub block: BlockPath,
    pub item: Option<usize>,
    pub start: usize,
    pub end: usize,
}

impl InlineSelection {
    pub fn new(block: BlockPath, start: usize, end: usize) -> Self {
        Self {
            block,
            item: None,
            start,
            end,
        }
    }

    pub fn in_list_item(block: BlockPath, item: usize, start: usize, end: usize) -> Self {
        Self {
            block,
            item: Some(item),
            start,
            end,
        }
    }

    /// Start and end in ascending order, for selections made backwards.
    pub fn ordered(&self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapOutcome {
    Wrapped,
    Unwrapped,
    /// Empty selection, nothing to do.
    Collapsed,
    /// The range could not be wrapped; the content is untouched.
    Failed,
}

impl WrapOutcome {
    pub fn changed(self) -> bool {
        matches!(self, WrapOutcome::Wrapped | WrapOutcome::Unwrapped)
    }
}

/// Toggles `tag` over `start..end` of `nodes`.
///
/// If the leaf at `start` sits inside a `tag` element, the nearest such
/// element is replaced by its children. Otherwise the range is wrapped in a
/// new element, at the deepest level whose single node contains it.
pub fn toggle_wrap(
    nodes: &mut Vec<InlineNode>,
    tag: InlineTag,
    start: usize,
    end: usize,
) -> WrapOutcome {
    if start >= end {
        return WrapOutcome::Collapsed;
    }
    if end > char_len(nodes) {
        return WrapOutcome::Failed;
    }
    if let Some(path) = enclosing(nodes, start, tag) {
        unwrap_at(nodes, &path);
        return WrapOutcome::Unwrapped;
    }
    if wrap_range(nodes, tag, start, end) {
        WrapOutcome::Wrapped
    } else {
        WrapOutcome::Failed
    }
}

/// Index path to the leaf holding the character at `offset`.
fn leaf_path(nodes: &[InlineNode], offset: usize) -> Option<Vec<usize>> {
    let mut node_start = 0;
    for (i, node) in nodes.iter().enumerate() {
        let len = node.char_len();
        if offset < node_start + len {
            return match node.children() {
                Some(children) => {
                    let mut path = leaf_path(children, offset - node_start)?;
                    path.insert(0, i);
                    Some(path)
                }
                None => Some(vec![i]),
            };
        }
        node_start += len;
    }
    None
}

/// Path of the nearest ancestor of the leaf at `offset` that is a `tag`.
fn enclosing(nodes: &[InlineNode], offset: usize, tag: InlineTag) -> Option<Vec<usize>> {
    let leaf = leaf_path(nodes, offset)?;
    (1..leaf.len())
        .rev()
        .map(|depth| &leaf[..depth])
        .find(|prefix| node_at(nodes, prefix).and_then(InlineNode::tag) == Some(tag))
        .map(<[usize]>::to_vec)
}

fn node_at<'a>(nodes: &'a [InlineNode], path: &[usize]) -> Option<&'a InlineNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(node.children()?, rest)
    }
}

fn sequence_at<'a>(
    nodes: &'a mut Vec<InlineNode>,
    path: &[usize],
) -> Option<&'a mut Vec<InlineNode>> {
    match path.split_first() {
        None => Some(nodes),
        Some((first, rest)) => sequence_at(nodes.get_mut(*first)?.children_mut()?, rest),
    }
}

fn unwrap_at(nodes: &mut Vec<InlineNode>, path: &[usize]) {
    let Some((&index, parent)) = path.split_last() else {
        return;
    };
    let Some(siblings) = sequence_at(nodes, parent) else {
        return;
    };
    let mut element = siblings.remove(index);
    let children = element.children_mut().map(std::mem::take).unwrap_or_default();
    siblings.splice(index..index, children);
    merge_adjacent_text(siblings);
}

fn split_at_char(text: &str, at: usize) -> (&str, &str) {
    let byte = text.char_indices().nth(at).map_or(text.len(), |(b, _)| b);
    text.split_at(byte)
}

fn wrap_range(nodes: &mut Vec<InlineNode>, tag: InlineTag, start: usize, end: usize) -> bool {
    let mut node_start = 0;
    for node in nodes.iter_mut() {
        let len = node.char_len();
        let node_end = node_start + len;
        if node_start <= start && end <= node_end {
            if let Some(children) = node.children_mut() {
                return wrap_range(children, tag, start - node_start, end - node_start);
            }
            break;
        }
        node_start = node_end;
    }

    // Elements must lie wholly inside or wholly outside the range.
    let mut node_start = 0;
    for node in nodes.iter() {
        let node_end = node_start + node.char_len();
        if !matches!(node, InlineNode::Text { .. }) {
            let inside = start <= node_start && node_end <= end;
            let outside = node_end <= start || node_start >= end;
            if !inside && !outside {
                return false;
            }
        }
        node_start = node_end;
    }

    let mut before = Vec::new();
    let mut selected = Vec::new();
    let mut after = Vec::new();
    let mut node_start = 0;
    for node in nodes.drain(..) {
        let node_end = node_start + node.char_len();
        match node {
            InlineNode::Text { text } => {
                let a = start.clamp(node_start, node_end) - node_start;
                let b = end.clamp(node_start, node_end) - node_start;
                let (head, rest) = split_at_char(&text, a);
                let (mid, tail) = split_at_char(rest, b - a);
                before.push(InlineNode::text(head));
                selected.push(InlineNode::text(mid));
                after.push(InlineNode::text(tail));
            }
            other if node_end <= start => before.push(other),
            other if node_start >= end => after.push(other),
            other => selected.push(other),
        }
        node_start = node_end;
    }
    merge_adjacent_text(&mut selected);
    before.push(tag.wrap(selected));
    before.extend(after);
    merge_adjacent_text(&mut before);
    *nodes = before;
    true
}
