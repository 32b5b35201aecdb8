use crate::editing::tree::BlockPath;

/// Result of applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    /// False when the command was a no-op.
    pub changed: bool,
    /// Block the editor should focus after the edit, if any.
    pub focus: Option<BlockPath>,
    pub version: u64,
}
