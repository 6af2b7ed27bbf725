// arbor/core/storage/src/node_store.rs

use crate::db::{column_families::*, RocksDB};
use arbor_sync::{Node, NodeHash, NodeReader, RootRecord, StorageError, StorageSink, TreeId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

fn db_err(err: anyhow::Error) -> StorageError {
    StorageError::Database(err.to_string())
}

fn ser_err(err: bincode::Error) -> StorageError {
    StorageError::Serialization(err.to_string())
}

/// Content-addressed node and root storage over RocksDB.
///
/// Node inserts are idempotent: a hash that already exists is left
/// untouched, so re-running a sync or racing syncs of the same tree
/// cannot corrupt stored content. Root writes go through a mutex so the
/// latest-generation pointer is never torn by concurrent commits.
pub struct NodeStore {
    db: Arc<RocksDB>,
    root_write_lock: Mutex<()>,
}

impl NodeStore {
    pub fn new(db: Arc<RocksDB>) -> Self {
        Self {
            db,
            root_write_lock: Mutex::new(()),
        }
    }

    /// Fetch a node by content hash
    pub fn get_node_sync(&self, hash: &NodeHash) -> Result<Option<Node>, StorageError> {
        match self.db.get_cf(CF_NODES, hash.as_bytes()).map_err(db_err)? {
            Some(bytes) => {
                let node = bincode::deserialize(&bytes)
                    .map_err(|e| StorageError::Corrupted(*hash, e.to_string()))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    pub fn has_node(&self, hash: &NodeHash) -> Result<bool, StorageError> {
        self.db.exists_cf(CF_NODES, hash.as_bytes()).map_err(db_err)
    }

    /// Latest committed root record for a tree, if any
    pub fn get_root(&self, tree_id: &TreeId) -> Result<Option<RootRecord>, StorageError> {
        match self
            .db
            .get_cf(CF_ROOTS, &latest_root_key(tree_id))
            .map_err(db_err)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    /// Root record for one specific generation
    pub fn get_root_at(
        &self,
        tree_id: &TreeId,
        generation: u64,
    ) -> Result<Option<RootRecord>, StorageError> {
        match self
            .db
            .get_cf(CF_ROOTS, &root_key(tree_id, generation))
            .map_err(db_err)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    /// All committed generations of a tree, oldest first
    pub fn get_roots(&self, tree_id: &TreeId) -> Result<Vec<RootRecord>, StorageError> {
        let latest = latest_root_key(tree_id);
        let mut records = Vec::new();
        for (key, value) in self
            .db
            .iter_cf_prefix(CF_ROOTS, tree_id.as_bytes())
            .map_err(db_err)?
        {
            if key.as_ref() == latest.as_slice() {
                continue;
            }
            records.push(bincode::deserialize(&value).map_err(ser_err)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl StorageSink for NodeStore {
    async fn insert_node(&self, hash: &NodeHash, node: &Node) -> Result<(), StorageError> {
        if self.has_node(hash)? {
            // Content-addressed: same hash means same content
            debug!("Node {} already stored, skipping", hash);
            return Ok(());
        }
        let bytes = bincode::serialize(node).map_err(ser_err)?;
        self.db
            .put_cf(CF_NODES, hash.as_bytes(), &bytes)
            .map_err(db_err)?;
        debug!("Stored node {}", hash);
        Ok(())
    }

    async fn insert_root(&self, record: &RootRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record).map_err(ser_err)?;
        let _guard = self.root_write_lock.lock();

        self.db
            .put_cf(CF_ROOTS, &root_key(&record.tree_id, record.generation), &bytes)
            .map_err(db_err)?;

        // Advance the latest pointer only forward
        let advance = match self.get_root(&record.tree_id)? {
            Some(latest) => record.generation >= latest.generation,
            None => true,
        };
        if advance {
            self.db
                .put_cf(CF_ROOTS, &latest_root_key(&record.tree_id), &bytes)
                .map_err(db_err)?;
        }
        debug!(
            "Committed root generation {} for tree {}",
            record.generation, record.tree_id
        );
        Ok(())
    }
}

#[async_trait]
impl NodeReader for NodeStore {
    async fn get_node(&self, hash: &NodeHash) -> Result<Option<Node>, StorageError> {
        self.get_node_sync(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_sync::{hasher, InternalNode, RootStatus, TerminalNode};
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> NodeStore {
        let db = Arc::new(RocksDB::open(dir.path()).unwrap());
        NodeStore::new(db)
    }

    fn terminal(key: &[u8], value: &[u8]) -> (NodeHash, Node) {
        (
            hasher::hash_terminal(key, value),
            Node::Terminal(TerminalNode {
                key: key.to_vec(),
                value: value.to_vec(),
            }),
        )
    }

    #[tokio::test]
    async fn test_node_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let (hash, node) = terminal(b"k1", b"v1");
        store.insert_node(&hash, &node).await.unwrap();

        assert!(store.has_node(&hash).unwrap());
        assert_eq!(store.get_node(&hash).await.unwrap(), Some(node));
        assert_eq!(
            store.get_node(&hasher::hash_atom(b"absent")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_internal_node_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let left = hasher::hash_terminal(b"k1", b"v1");
        let right = hasher::hash_terminal(b"k2", b"v2");
        let hash = hasher::hash_internal(&left, &right);
        let node = Node::Internal(InternalNode { left, right });

        store.insert_node(&hash, &node).await.unwrap();
        assert_eq!(store.get_node(&hash).await.unwrap(), Some(node));
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let (hash, node) = terminal(b"k1", b"v1");
        store.insert_node(&hash, &node).await.unwrap();
        store.insert_node(&hash, &node).await.unwrap();

        assert_eq!(store.get_node(&hash).await.unwrap(), Some(node));
    }

    #[tokio::test]
    async fn test_root_generations() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let tree_id = TreeId::new([3; 32]);

        let gen1 = RootRecord {
            tree_id,
            node_hash: Some(hasher::hash_atom(b"root1")),
            status: RootStatus::Committed,
            generation: 1,
        };
        let gen2 = RootRecord {
            tree_id,
            node_hash: Some(hasher::hash_atom(b"root2")),
            status: RootStatus::Committed,
            generation: 2,
        };

        store.insert_root(&gen1).await.unwrap();
        store.insert_root(&gen2).await.unwrap();

        assert_eq!(store.get_root(&tree_id).unwrap(), Some(gen2.clone()));
        assert_eq!(store.get_root_at(&tree_id, 1).unwrap(), Some(gen1.clone()));

        // Re-committing an older generation must not move the latest
        // pointer backwards.
        store.insert_root(&gen1).await.unwrap();
        assert_eq!(store.get_root(&tree_id).unwrap(), Some(gen2));

        let all = store.get_roots(&tree_id).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].generation, 1);
        assert_eq!(all[1].generation, 2);
    }

    #[tokio::test]
    async fn test_roots_isolated_per_tree() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let record = RootRecord {
            tree_id: TreeId::new([1; 32]),
            node_hash: None,
            status: RootStatus::Committed,
            generation: 5,
        };
        store.insert_root(&record).await.unwrap();

        assert!(store.get_root(&TreeId::new([2; 32])).unwrap().is_none());
        assert_eq!(store.get_root(&record.tree_id).unwrap(), Some(record));
    }
}
