// arbor/core/sync/src/orchestrator.rs

//! The streaming download-and-verify loop.
//!
//! Reconstructs an arbitrarily large binary Merkle tree from a server
//! that streams nodes in left-to-right depth-first order, verifying
//! every node's hash against its content before it is persisted. Memory
//! use is proportional to tree height: the traversal keeps only the
//! stack of deferred right siblings and the cache of internal nodes
//! whose right subtree is still downloading.

use crate::error::SyncError;
use crate::hasher;
use crate::pending::PendingSiblingCache;
use crate::sink::StorageSink;
use crate::source::{DecodedRow, NodeSource, RootResponse};
use crate::traversal::TraversalStack;
use crate::types::{Node, NodeHash, RootRecord, TerminalNode, TreeId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Deepest tree the sync will accept before treating the stream as
/// malformed
pub const DEFAULT_MAX_TREE_HEIGHT: usize = 100;

/// Tunables for one sync
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on unresolved pending internal nodes; a correct
    /// stream never exceeds the tree's height.
    pub max_tree_height: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_tree_height: DEFAULT_MAX_TREE_HEIGHT,
        }
    }
}

/// Counters and timings for a completed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub terminal_nodes: u64,
    pub internal_nodes: u64,
    pub elapsed: Duration,
    /// Root the downloaded generation was verified against (None for an
    /// empty tree)
    pub root_hash: Option<NodeHash>,
    pub generation: u64,
}

/// Final state of a sync attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The whole tree was verified, persisted and committed
    Completed(SyncStats),
    /// The remote root moved mid-download. Benign: nothing was
    /// committed and the caller may retry.
    RootChanged,
}

/// Drives the depth-first download against a NodeSource and writes
/// verified nodes into a StorageSink
pub struct SyncOrchestrator<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    config: SyncConfig,
}

impl<S: NodeSource, K: StorageSink> SyncOrchestrator<S, K> {
    pub fn new(source: Arc<S>, sink: Arc<K>) -> Self {
        Self::with_config(source, sink, SyncConfig::default())
    }

    pub fn with_config(source: Arc<S>, sink: Arc<K>, config: SyncConfig) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    /// Download, verify and persist one tree.
    ///
    /// Nodes are written incrementally; the root record at the end is
    /// the sole commit point. On any abort, nodes already written remain
    /// as unreferenced content-addressed orphans.
    pub async fn sync(&self, tree_id: TreeId) -> Result<SyncOutcome, SyncError> {
        let started = Instant::now();
        let root = self
            .source
            .get_root(&tree_id)
            .await
            .map_err(SyncError::Transport)?;

        let root_hash = match root.node_hash {
            Some(hash) => hash,
            None => {
                // Empty tree: nothing to download, commit immediately
                info!(tree = %tree_id, "remote tree is empty");
                self.commit_root(&root).await?;
                return Ok(SyncOutcome::Completed(SyncStats {
                    terminal_nodes: 0,
                    internal_nodes: 0,
                    elapsed: started.elapsed(),
                    root_hash: None,
                    generation: root.generation,
                }));
            }
        };
        info!(tree = %tree_id, root = %root_hash, generation = root.generation, "starting sync");

        let mut stack = TraversalStack::new();
        let mut pending = PendingSiblingCache::new(self.config.max_tree_height);
        let mut terminal_nodes = 0u64;
        let mut internal_nodes = 0u64;

        let mut current = Some(root_hash);
        while let Some(node_hash) = current {
            let batch = self
                .source
                .get_nodes(&tree_id, &node_hash, &root_hash)
                .await
                .map_err(SyncError::Transport)?;

            if batch.root_changed {
                warn!(tree = %tree_id, root = %root_hash, "remote root changed mid-download, aborting");
                return Ok(SyncOutcome::RootChanged);
            }

            let mut cursor = Some(node_hash);
            for row in &batch.answer {
                let decoded = row.decode()?;
                let claimed = decoded.claimed_hash();

                // Ordering contract: each row must be exactly the node
                // the traversal expects next.
                let expected = match cursor {
                    Some(expected) => expected,
                    None => return Err(SyncError::TrailingRow { got: claimed }),
                };
                if claimed != expected {
                    return Err(SyncError::ProtocolViolation {
                        expected,
                        got: claimed,
                    });
                }

                match decoded {
                    DecodedRow::Terminal { hash, key, value } => {
                        let actual = hasher::hash_terminal(&key, &value);
                        if actual != hash {
                            return Err(SyncError::HashMismatch {
                                node: hash,
                                expected: hash,
                                actual,
                            });
                        }
                        self.sink
                            .insert_node(&hash, &Node::Terminal(TerminalNode { key, value }))
                            .await?;
                        terminal_nodes += 1;

                        // A finished terminal may complete a chain of
                        // internal nodes waiting on their right subtree.
                        let mut chain = pending.resolve_chain(hash);
                        while let Some((parent_hash, node)) = chain.next() {
                            self.sink
                                .insert_node(&parent_hash, &Node::Internal(node))
                                .await?;
                            internal_nodes += 1;
                        }

                        cursor = stack.pop_or_none();
                    }
                    DecodedRow::Internal { hash, left, right } => {
                        let actual = hasher::hash_internal(&left, &right);
                        if actual != hash {
                            return Err(SyncError::HashMismatch {
                                node: hash,
                                expected: hash,
                                actual,
                            });
                        }
                        // Persisted later, once the right subtree is
                        // fully verified.
                        pending.put(right, hash, left)?;
                        stack.push_right(right);
                        cursor = Some(left);
                    }
                }
            }
            debug!(
                tree = %tree_id,
                batch = batch.answer.len(),
                pending = pending.len(),
                stacked = stack.len(),
                "validated batch"
            );
            current = cursor;
        }

        self.commit_root(&root).await?;
        let stats = SyncStats {
            terminal_nodes,
            internal_nodes,
            elapsed: started.elapsed(),
            root_hash: Some(root_hash),
            generation: root.generation,
        };
        info!(
            tree = %tree_id,
            root = %root_hash,
            terminal_nodes,
            internal_nodes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "sync complete"
        );
        Ok(SyncOutcome::Completed(stats))
    }

    async fn commit_root(&self, root: &RootResponse) -> Result<(), SyncError> {
        let record = RootRecord {
            tree_id: root.tree_id,
            node_hash: root.node_hash,
            status: root.status,
            generation: root.generation,
        };
        self.sink.insert_root(&record).await?;
        Ok(())
    }
}
