// arbor/core/storage/tests/sync_integration.rs

//! End-to-end: a scripted server streamed through the sync core into a
//! real RocksDB store, then checked with the completeness audit.

use arbor_storage::{NodeStore, RocksDB};
use arbor_sync::{
    hasher, verify_complete, NodeHash, NodeRow, NodeSource, NodesResponse, RootResponse,
    RootStatus, SyncOrchestrator, SyncOutcome, TreeId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tempfile::TempDir;

struct ScriptedSource {
    root: RootResponse,
    batches: Mutex<VecDeque<NodesResponse>>,
}

#[async_trait]
impl NodeSource for ScriptedSource {
    async fn get_root(&self, _tree_id: &TreeId) -> anyhow::Result<RootResponse> {
        Ok(self.root.clone())
    }

    async fn get_nodes(
        &self,
        _tree_id: &TreeId,
        _node_hash: &NodeHash,
        _root_hash: &NodeHash,
    ) -> anyhow::Result<NodesResponse> {
        self.batches
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no more batches scripted"))
    }
}

fn terminal_row(key: &[u8], value: &[u8]) -> NodeRow {
    NodeRow {
        hash: hasher::hash_terminal(key, value).to_hex(),
        is_terminal: true,
        key: Some(hex::encode(key)),
        value: Some(hex::encode(value)),
        left: None,
        right: None,
    }
}

fn internal_row(left: NodeHash, right: NodeHash) -> NodeRow {
    NodeRow {
        hash: hasher::hash_internal(&left, &right).to_hex(),
        is_terminal: false,
        key: None,
        value: None,
        left: Some(left.to_hex()),
        right: Some(right.to_hex()),
    }
}

#[tokio::test]
async fn test_sync_into_rocksdb_and_audit() {
    let t1 = hasher::hash_terminal(b"alpha", b"1");
    let t2 = hasher::hash_terminal(b"beta", b"2");
    let t3 = hasher::hash_terminal(b"gamma", b"3");
    let i2 = hasher::hash_internal(&t1, &t2);
    let root = hasher::hash_internal(&i2, &t3);
    let tree_id = TreeId::new([9; 32]);

    let rows = vec![
        internal_row(i2, t3),
        internal_row(t1, t2),
        terminal_row(b"alpha", b"1"),
        terminal_row(b"beta", b"2"),
        terminal_row(b"gamma", b"3"),
    ];
    let source = Arc::new(ScriptedSource {
        root: RootResponse {
            tree_id,
            node_hash: Some(root),
            status: RootStatus::Committed,
            generation: 1,
        },
        batches: Mutex::new(VecDeque::from(vec![NodesResponse {
            root_changed: false,
            answer: rows,
        }])),
    });

    let dir = TempDir::new().unwrap();
    let store = Arc::new(NodeStore::new(Arc::new(RocksDB::open(dir.path()).unwrap())));

    let orchestrator = SyncOrchestrator::new(source, store.clone());
    let outcome = orchestrator.sync(tree_id).await.unwrap();
    let stats = match outcome {
        SyncOutcome::Completed(stats) => stats,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(stats.terminal_nodes, 3);
    assert_eq!(stats.internal_nodes, 2);

    // Every reachable node landed in storage
    let report = verify_complete(store.as_ref(), &root).await.unwrap();
    assert_eq!(report.terminal_nodes, 3);
    assert_eq!(report.internal_nodes, 2);

    // The committed generation names the verified root
    let record = store.get_root(&tree_id).unwrap().unwrap();
    assert_eq!(record.node_hash, Some(root));
    assert_eq!(record.generation, 1);
}
