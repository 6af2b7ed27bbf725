// arbor/core/sync/src/sink.rs

use crate::types::{Node, NodeHash, RootRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted record for {0}: {1}")]
    Corrupted(NodeHash, String),
}

/// Persists verified nodes and, at the very end of a sync, the root
/// record that commits a generation.
///
/// Node inserts must be idempotent (content-addressed: inserting the
/// same hash twice is a no-op) and atomic per node. Root writes must be
/// serialized per tree id so concurrent syncs cannot tear the current
/// generation. A sync that aborts mid-way leaves already-written nodes
/// behind as harmless, unreferenced orphans.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Persist one verified node under its content hash
    async fn insert_node(&self, hash: &NodeHash, node: &Node) -> Result<(), StorageError>;

    /// Commit a fully downloaded generation
    async fn insert_root(&self, record: &RootRecord) -> Result<(), StorageError>;
}

/// Read-back access to stored nodes, used only by the completeness audit
#[async_trait]
pub trait NodeReader: Send + Sync {
    async fn get_node(&self, hash: &NodeHash) -> Result<Option<Node>, StorageError>;
}
