// arbor/core/storage/src/db/mod.rs

// Database module
pub mod column_families;
pub mod rocks_db;

pub use rocks_db::RocksDB;
