// arbor/core/sync/src/lib.rs

pub mod audit;
pub mod error;
pub mod hasher;
pub mod orchestrator;
pub mod pending;
pub mod sink;
pub mod source;
pub mod traversal;
pub mod types;

pub use audit::{verify_complete, AuditReport};
pub use error::SyncError;
pub use orchestrator::{
    SyncConfig, SyncOrchestrator, SyncOutcome, SyncStats, DEFAULT_MAX_TREE_HEIGHT,
};
pub use pending::{PendingEntry, PendingSiblingCache};
pub use sink::{NodeReader, StorageError, StorageSink};
pub use source::{DecodedRow, NodeRow, NodeSource, NodesResponse, RootResponse};
pub use traversal::TraversalStack;
pub use types::*;
