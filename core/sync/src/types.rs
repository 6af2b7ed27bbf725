// arbor/core/sync/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when parsing a 32-byte identifier from its hex form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDigestError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

fn decode_digest(s: &str) -> Result<[u8; 32], ParseDigestError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| ParseDigestError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(ParseDigestError::InvalidLength(bytes.len()));
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&bytes);
    Ok(digest)
}

/// Content-derived digest identifying a tree node
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord,
)]
pub struct NodeHash([u8; 32]);

impl NodeHash {
    pub fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, ParseDigestError> {
        decode_digest(s).map(Self)
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..8])
    }
}

/// Identifier of one logical tree on the server
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord,
)]
pub struct TreeId([u8; 32]);

impl TreeId {
    pub fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseDigestError> {
        decode_digest(s).map(Self)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..8])
    }
}

/// Leaf of the tree holding a key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalNode {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Branch of the tree holding its ordered child hashes.
/// Left/right order is semantically significant and must never be swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalNode {
    pub left: NodeHash,
    pub right: NodeHash,
}

/// A tree node of either kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Terminal(TerminalNode),
    Internal(InternalNode),
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }
}

/// Lifecycle status of a tree root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootStatus {
    Pending = 1,
    Committed = 2,
}

impl RootStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(RootStatus::Pending),
            2 => Some(RootStatus::Committed),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Trust anchor for one downloaded generation of a tree.
/// Written once at the end of a successful sync and never mutated;
/// a later sync writes a new generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRecord {
    pub tree_id: TreeId,
    /// None encodes the empty tree
    pub node_hash: Option<NodeHash>,
    pub status: RootStatus,
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_hash_display() {
        let hash = NodeHash::new([0x12; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(format!("{}", hash), "12121212");
    }

    #[test]
    fn test_node_hash_from_hex() {
        let hash = NodeHash::new([0xab; 32]);
        assert_eq!(NodeHash::from_hex(&hash.to_hex()).unwrap(), hash);

        // 0x prefix is accepted
        let prefixed = format!("0x{}", hash.to_hex());
        assert_eq!(NodeHash::from_hex(&prefixed).unwrap(), hash);
    }

    #[test]
    fn test_node_hash_from_hex_rejects_bad_input() {
        assert!(matches!(
            NodeHash::from_hex("zz"),
            Err(ParseDigestError::InvalidHex(_))
        ));
        assert!(matches!(
            NodeHash::from_hex("abcd"),
            Err(ParseDigestError::InvalidLength(2))
        ));
    }

    #[test]
    fn test_root_status_roundtrip() {
        assert_eq!(RootStatus::from_u8(1), Some(RootStatus::Pending));
        assert_eq!(RootStatus::from_u8(2), Some(RootStatus::Committed));
        assert_eq!(RootStatus::from_u8(3), None);
        assert_eq!(RootStatus::Committed.as_u8(), 2);
    }
}
