// arbor/core/sync/src/error.rs

use crate::sink::StorageError;
use crate::types::NodeHash;
use thiserror::Error;

/// Fatal failure modes of a sync.
///
/// A benign mid-download root change is not an error; it surfaces as
/// `SyncOutcome::RootChanged` so callers can retry without inspecting
/// error values.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Node content does not hash to the hash it was requested under:
    /// tampering or corruption on the server side.
    #[error("hash mismatch for node {node}: content hashes to {actual}, expected {expected}")]
    HashMismatch {
        node: NodeHash,
        expected: NodeHash,
        actual: NodeHash,
    },

    /// The server broke the left-to-right ordering contract
    #[error("out-of-order delivery: expected node {expected}, got {got}")]
    ProtocolViolation { expected: NodeHash, got: NodeHash },

    /// The server kept sending rows after the traversal was exhausted
    #[error("server sent node {got} after traversal completed")]
    TrailingRow { got: NodeHash },

    /// More unresolved internal nodes than the configured maximum tree
    /// height allows: a malformed or adversarial stream.
    #[error("pending-node cache exceeded the maximum tree height of {limit}")]
    CapacityExceeded { limit: usize },

    /// A wire row could not be decoded into a node
    #[error("malformed node row ({field}): {reason}")]
    Decode {
        field: &'static str,
        reason: String,
    },

    /// Reachable node absent from storage, reported by the completeness audit
    #[error("node {0} is missing from storage")]
    MissingNode(NodeHash),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Propagated from the network collaborator unmodified
    #[error("transport error: {0}")]
    Transport(anyhow::Error),
}
