// arbor/core/sync/src/pending.rs

use crate::error::SyncError;
use crate::types::{InternalNode, NodeHash};
use std::collections::HashMap;

/// An internal node waiting for its right subtree to finish downloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEntry {
    /// Hash the completed internal node will be stored under
    pub parent: NodeHash,
    /// Already-validated left child hash
    pub left: NodeHash,
}

/// Bounded map from a right-child hash to the internal node awaiting it.
///
/// During a correct depth-first download at most one internal node per
/// level of the current left spine is pending, so the entry count is
/// bounded by the tree height. Exceeding the configured bound means the
/// stream is malformed or adversarial, not that the tree is large.
#[derive(Debug)]
pub struct PendingSiblingCache {
    entries: HashMap<NodeHash, PendingEntry>,
    capacity: usize,
}

impl PendingSiblingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an internal node awaiting its right child.
    /// Fails when the entry count would exceed the maximum tree height.
    pub fn put(
        &mut self,
        right: NodeHash,
        parent: NodeHash,
        left: NodeHash,
    ) -> Result<(), SyncError> {
        if self.entries.len() >= self.capacity {
            return Err(SyncError::CapacityExceeded {
                limit: self.capacity,
            });
        }
        self.entries.insert(right, PendingEntry { parent, left });
        Ok(())
    }

    /// Remove and return the entry waiting on `hash`, if any
    pub fn take_if_present(&mut self, hash: &NodeHash) -> Option<PendingEntry> {
        self.entries.remove(hash)
    }

    /// Iterate the internal nodes completed by the arrival of `resolved`.
    ///
    /// Each step removes the entry keyed by the current hash and yields
    /// the finished internal node together with its own hash, which then
    /// becomes the lookup key for the next step. A single terminal-node
    /// arrival can thereby cascade several completions up the tree.
    pub fn resolve_chain(&mut self, resolved: NodeHash) -> ResolveChain<'_> {
        ResolveChain {
            cache: self,
            current: resolved,
        }
    }
}

/// Lazy cascade of completed internal nodes, bottom-up
pub struct ResolveChain<'a> {
    cache: &'a mut PendingSiblingCache,
    current: NodeHash,
}

impl Iterator for ResolveChain<'_> {
    /// (hash of the completed internal node, the node itself)
    type Item = (NodeHash, InternalNode);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cache.take_if_present(&self.current)?;
        let node = InternalNode {
            left: entry.left,
            right: self.current,
        };
        self.current = entry.parent;
        Some((entry.parent, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> NodeHash {
        NodeHash::new([byte; 32])
    }

    #[test]
    fn test_put_and_take() {
        let mut cache = PendingSiblingCache::new(10);
        cache.put(h(1), h(2), h(3)).unwrap();
        assert_eq!(cache.len(), 1);

        let entry = cache.take_if_present(&h(1)).unwrap();
        assert_eq!(entry.parent, h(2));
        assert_eq!(entry.left, h(3));
        assert!(cache.is_empty());
        assert!(cache.take_if_present(&h(1)).is_none());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut cache = PendingSiblingCache::new(2);
        cache.put(h(1), h(10), h(20)).unwrap();
        cache.put(h(2), h(11), h(21)).unwrap();

        let err = cache.put(h(3), h(12), h(22)).unwrap_err();
        assert!(matches!(err, SyncError::CapacityExceeded { limit: 2 }));
    }

    #[test]
    fn test_resolve_chain_cascades() {
        // Chain of two pending parents: resolving h(1) completes the node
        // stored under h(2), whose completion in turn completes h(3).
        let mut cache = PendingSiblingCache::new(10);
        cache.put(h(1), h(2), h(20)).unwrap();
        cache.put(h(2), h(3), h(30)).unwrap();

        let completed: Vec<_> = cache.resolve_chain(h(1)).collect();
        assert_eq!(completed.len(), 2);
        assert_eq!(
            completed[0],
            (
                h(2),
                InternalNode {
                    left: h(20),
                    right: h(1)
                }
            )
        );
        assert_eq!(
            completed[1],
            (
                h(3),
                InternalNode {
                    left: h(30),
                    right: h(2)
                }
            )
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_resolve_chain_stops_at_unrelated_entries() {
        let mut cache = PendingSiblingCache::new(10);
        cache.put(h(1), h(2), h(20)).unwrap();
        cache.put(h(9), h(8), h(80)).unwrap();

        let completed: Vec<_> = cache.resolve_chain(h(1)).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(cache.len(), 1);
    }
}
