// arbor/core/storage/src/db/rocks_db.rs

use super::column_families::ALL_COLUMN_FAMILIES;
use anyhow::{anyhow, Result};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;
use tracing::info;

/// Thin wrapper over a column-family RocksDB instance
pub struct RocksDB {
    db: DB,
}

impl RocksDB {
    /// Open (or create) the database with all known column families
    pub fn open(path: &Path) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        info!("Opened database at {}", path.display());
        Ok(Self { db })
    }

    fn cf_handle(&self, cf: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf)
            .ok_or_else(|| anyhow!("missing column family: {}", cf))
    }

    pub fn put_cf(&self, cf: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let handle = self.cf_handle(cf)?;
        self.db.put_cf(handle, key, value)?;
        Ok(())
    }

    pub fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let handle = self.cf_handle(cf)?;
        Ok(self.db.get_cf(handle, key)?)
    }

    pub fn exists_cf(&self, cf: &str, key: &[u8]) -> Result<bool> {
        let handle = self.cf_handle(cf)?;
        Ok(self.db.get_pinned_cf(handle, key)?.is_some())
    }

    pub fn delete_cf(&self, cf: &str, key: &[u8]) -> Result<()> {
        let handle = self.cf_handle(cf)?;
        self.db.delete_cf(handle, key)?;
        Ok(())
    }

    /// Iterate a column family over keys starting with `prefix`
    pub fn iter_cf_prefix(&self, cf: &str, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let handle = self.cf_handle(cf)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(
            handle,
            IteratorMode::From(prefix, rocksdb::Direction::Forward),
        ) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            rows.push((key, value));
        }
        Ok(rows)
    }
}
