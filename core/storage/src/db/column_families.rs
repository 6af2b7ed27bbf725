// arbor/core/storage/src/db/column_families.rs

use arbor_sync::TreeId;

/// Verified nodes, keyed by content hash
pub const CF_NODES: &str = "nodes";

/// Root records, one row per committed generation plus a latest pointer
pub const CF_ROOTS: &str = "roots";

pub const ALL_COLUMN_FAMILIES: &[&str] = &[CF_NODES, CF_ROOTS];

/// Key for one committed generation of a tree: tree_id || be64(generation)
pub fn root_key(tree_id: &TreeId, generation: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(tree_id.as_bytes());
    key.extend_from_slice(&generation.to_be_bytes());
    key
}

/// Key for the latest-generation pointer of a tree: tree_id || "latest"
pub fn latest_root_key(tree_id: &TreeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(38);
    key.extend_from_slice(tree_id.as_bytes());
    key.extend_from_slice(b"latest");
    key
}
