//! RocksDB wrapper for catalog storage.
//!
//! Provides:
//! - Database open/close with column family setup
//! - Generic column-family reads, writes and prefix scans
//! - Write transactions serialized by a process-wide lock
//! - Admin operations (stats, compaction, flush)

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::{debug, info};

use crate::column_families::{build_cf_descriptors, ALL_CF_NAMES};
use crate::error::StorageError;
use crate::kv::KeyValue;
use crate::transaction::Transaction;

/// Main storage interface for the catalog
pub struct Storage {
    db: DB,
    /// Held by every open write transaction
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Resolve a column family handle.
    pub(crate) fn cf(&self, cf_name: &str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(cf_name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(cf_name.to_string()))
    }

    /// Begin a write transaction.
    ///
    /// Blocks until any other open transaction has committed or been dropped.
    /// Writes are staged in memory and applied atomically by
    /// [`Transaction::commit`].
    pub fn begin(&self) -> Result<Transaction<'_>, StorageError> {
        let guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        debug!("Began write transaction");
        Ok(Transaction::new(self, guard))
    }

    /// Apply a batch atomically.
    pub(crate) fn write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.db.write(batch)?;
        Ok(())
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    // ===== Admin Operations =====

    /// Trigger manual compaction on all column families.
    pub fn compact(&self) -> Result<(), StorageError> {
        info!("Starting full compaction...");
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.compact_range_cf::<&[u8], &[u8]>(cf, None, None);
            }
        }
        info!("Compaction complete");
        Ok(())
    }

    /// Trigger compaction on a specific column family.
    pub fn compact_cf(&self, cf_name: &str) -> Result<(), StorageError> {
        let cf = self.cf(cf_name)?;
        info!(cf = %cf_name, "Starting compaction...");
        self.db.compact_range_cf::<&[u8], &[u8]>(cf, None, None);
        info!(cf = %cf_name, "Compaction complete");
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let mut stats = StorageStats::default();

        for cf_name in ALL_CF_NAMES {
            let cf = self.cf(cf_name)?;
            stats
                .entries
                .insert(cf_name.to_string(), self.count_cf_entries(cf)?);
        }

        stats.disk_usage_bytes = self.get_disk_usage();

        Ok(stats)
    }

    fn count_cf_entries(&self, cf: &ColumnFamily) -> Result<u64, StorageError> {
        let mut count = 0u64;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn get_disk_usage(&self) -> u64 {
        let path = self.db.path();
        let mut total_size = 0u64;

        if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        total_size
    }
}

impl KeyValue for Storage {
    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = self.cf(cf_name)?;
        let result = self.db.get_cf(cf, key)?;
        Ok(result)
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    fn delete(&self, cf_name: &str, key: &[u8]) -> Result<(), StorageError> {
        let cf = self.cf(cf_name)?;
        self.db.delete_cf(cf, key)?;
        Ok(())
    }

    fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let cf = self.cf(cf_name)?;

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            // Stop if we've passed the prefix
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }

        Ok(results)
    }

    /// Keys-only scan; values are never copied out of RocksDB.
    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<u64, StorageError> {
        let cf = self.cf(cf_name)?;

        let mut count = 0u64;
        let mut iter = self.db.raw_iterator_cf(cf);
        iter.seek(prefix);
        while let Some(key) = iter.key() {
            if !key.starts_with(prefix) {
                break;
            }
            count += 1;
            iter.next();
        }
        iter.status()?;

        Ok(count)
    }
}

/// Statistics about the storage.
#[derive(Debug, Default)]
pub struct StorageStats {
    /// Raw entry count per column family (records plus index entries)
    pub entries: BTreeMap<String, u64>,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}
