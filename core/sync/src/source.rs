// arbor/core/sync/src/source.rs

use crate::error::SyncError;
use crate::types::{NodeHash, ParseDigestError, RootStatus, TreeId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Current root of a tree as reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResponse {
    pub tree_id: TreeId,
    /// None for an empty tree
    pub node_hash: Option<NodeHash>,
    pub status: RootStatus,
    pub generation: u64,
}

/// One batch of nodes streamed by the server, in left-to-right
/// depth-first order starting at the requested node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodesResponse {
    /// The remote root moved since the download started; the sync must
    /// abort without committing anything.
    pub root_changed: bool,
    pub answer: Vec<NodeRow>,
}

/// Wire form of one node row. Hashes, keys and values are hex-encoded
/// byte sequences at this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    pub hash: String,
    pub is_terminal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

/// A node row decoded to raw bytes, ready for hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRow {
    Terminal {
        hash: NodeHash,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Internal {
        hash: NodeHash,
        left: NodeHash,
        right: NodeHash,
    },
}

impl DecodedRow {
    /// Hash the server claims for this row
    pub fn claimed_hash(&self) -> NodeHash {
        match self {
            DecodedRow::Terminal { hash, .. } => *hash,
            DecodedRow::Internal { hash, .. } => *hash,
        }
    }
}

fn decode_err(field: &'static str, err: ParseDigestError) -> SyncError {
    SyncError::Decode {
        field,
        reason: err.to_string(),
    }
}

fn missing(field: &'static str) -> SyncError {
    SyncError::Decode {
        field,
        reason: "field missing".to_string(),
    }
}

fn decode_bytes(field: &'static str, s: &str) -> Result<Vec<u8>, SyncError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| SyncError::Decode {
        field,
        reason: e.to_string(),
    })
}

impl NodeRow {
    /// Decode the hex wire fields into raw bytes and hashes
    pub fn decode(&self) -> Result<DecodedRow, SyncError> {
        let hash = NodeHash::from_hex(&self.hash).map_err(|e| decode_err("hash", e))?;
        if self.is_terminal {
            let key = self.key.as_deref().ok_or_else(|| missing("key"))?;
            let value = self.value.as_deref().ok_or_else(|| missing("value"))?;
            Ok(DecodedRow::Terminal {
                hash,
                key: decode_bytes("key", key)?,
                value: decode_bytes("value", value)?,
            })
        } else {
            let left = self.left.as_deref().ok_or_else(|| missing("left"))?;
            let right = self.right.as_deref().ok_or_else(|| missing("right"))?;
            Ok(DecodedRow::Internal {
                hash,
                left: NodeHash::from_hex(left).map_err(|e| decode_err("left", e))?,
                right: NodeHash::from_hex(right).map_err(|e| decode_err("right", e))?,
            })
        }
    }
}

/// Supplies tree nodes on demand. Transport, framing and retry policy
/// live behind this boundary; errors pass through unmodified.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Fetch the current root record for a tree
    async fn get_root(&self, tree_id: &TreeId) -> anyhow::Result<RootResponse>;

    /// Fetch the next batch of nodes starting at `node_hash`, relative to
    /// the root the caller captured at the start of the download. The
    /// server signals via `root_changed` if that root is no longer
    /// current.
    async fn get_nodes(
        &self,
        tree_id: &TreeId,
        node_hash: &NodeHash,
        root_hash: &NodeHash,
    ) -> anyhow::Result<NodesResponse>;
}
