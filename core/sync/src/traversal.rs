// arbor/core/sync/src/traversal.rs

use crate::types::NodeHash;

/// Explicit depth-first traversal state.
///
/// Right siblings are stacked while the left spine is descended; popping
/// in LIFO order reproduces a depth-first, left-to-right visitation with
/// O(height) memory instead of recursion.
#[derive(Debug, Default)]
pub struct TraversalStack {
    stack: Vec<NodeHash>,
}

impl TraversalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a right sibling to visit after the current descent completes
    pub fn push_right(&mut self, hash: NodeHash) {
        self.stack.push(hash);
    }

    /// Most recently deferred right sibling, or None when traversal is done
    pub fn pop_or_none(&mut self) -> Option<NodeHash> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
