// arbor/core/sync/src/audit.rs

//! Opt-in post-sync completeness check.
//!
//! Walks every node reachable from a root and verifies it is present in
//! storage. Keeps the set of visited hashes in memory, so the cost is
//! proportional to tree size; intended for small trees and tests, never
//! for the sync hot path.

use crate::error::SyncError;
use crate::sink::NodeReader;
use crate::types::{Node, NodeHash};
use std::collections::HashSet;

/// Node counts gathered by a completeness walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditReport {
    pub terminal_nodes: u64,
    pub internal_nodes: u64,
}

/// Verify that every node reachable from `root` exists in storage.
///
/// Fails with `SyncError::MissingNode` on the first absent node. Shared
/// subtrees are counted once.
pub async fn verify_complete<R: NodeReader>(
    reader: &R,
    root: &NodeHash,
) -> Result<AuditReport, SyncError> {
    let mut report = AuditReport::default();
    let mut visited: HashSet<NodeHash> = HashSet::new();
    let mut stack = vec![*root];

    while let Some(hash) = stack.pop() {
        if !visited.insert(hash) {
            continue;
        }
        match reader.get_node(&hash).await? {
            Some(Node::Terminal(_)) => report.terminal_nodes += 1,
            Some(Node::Internal(node)) => {
                report.internal_nodes += 1;
                stack.push(node.left);
                stack.push(node.right);
            }
            None => return Err(SyncError::MissingNode(hash)),
        }
    }
    Ok(report)
}
