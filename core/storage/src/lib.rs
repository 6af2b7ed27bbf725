// arbor/core/storage/src/lib.rs

pub mod db;
pub mod node_store;

pub use db::RocksDB;
pub use node_store::NodeStore;
