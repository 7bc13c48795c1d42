//! Serialized write transactions.
//!
//! A [`Transaction`] holds the storage write lock for its lifetime, so
//! read-then-write sequences (count siblings then insert, delete then
//! renumber) cannot interleave with another writer in this process.
//!
//! Writes are staged in memory and are visible to reads made through the
//! same transaction. [`Transaction::commit`] applies them in one
//! `WriteBatch`; dropping the transaction discards them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::MutexGuard;

use rocksdb::WriteBatch;
use tracing::debug;

use crate::db::Storage;
use crate::error::StorageError;
use crate::kv::KeyValue;

/// Staged operation: `Some` is a put, `None` is a delete.
type Staged = BTreeMap<(String, Vec<u8>), Option<Vec<u8>>>;

/// An open write transaction on [`Storage`].
pub struct Transaction<'a> {
    storage: &'a Storage,
    _guard: MutexGuard<'a, ()>,
    staged: RefCell<Staged>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(storage: &'a Storage, guard: MutexGuard<'a, ()>) -> Self {
        Self {
            storage,
            _guard: guard,
            staged: RefCell::new(BTreeMap::new()),
        }
    }

    /// Number of staged puts and deletes.
    pub fn staged_len(&self) -> usize {
        self.staged.borrow().len()
    }

    /// Apply all staged writes atomically and release the write lock.
    ///
    /// Returns the number of operations written.
    pub fn commit(self) -> Result<usize, StorageError> {
        let staged = self.staged.into_inner();
        let count = staged.len();
        if count == 0 {
            return Ok(0);
        }

        let mut batch = WriteBatch::default();
        for ((cf_name, key), op) in &staged {
            let cf = self.storage.cf(cf_name)?;
            match op {
                Some(value) => batch.put_cf(cf, key, value),
                None => batch.delete_cf(cf, key),
            }
        }

        self.storage.write(batch)?;
        debug!(operations = count, "Committed write transaction");
        Ok(count)
    }

    /// Discard all staged writes and release the write lock.
    pub fn rollback(self) {
        debug!(
            operations = self.staged.borrow().len(),
            "Rolled back write transaction"
        );
    }
}

impl KeyValue for Transaction<'_> {
    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if let Some(op) = self.staged.borrow().get(&(cf_name.to_string(), key.to_vec())) {
            return Ok(op.clone());
        }
        self.storage.get(cf_name, key)
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        // Fail early on an unknown column family rather than at commit.
        self.storage.cf(cf_name)?;
        self.staged
            .borrow_mut()
            .insert((cf_name.to_string(), key.to_vec()), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, cf_name: &str, key: &[u8]) -> Result<(), StorageError> {
        self.storage.cf(cf_name)?;
        self.staged
            .borrow_mut()
            .insert((cf_name.to_string(), key.to_vec()), None);
        Ok(())
    }

    fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self
            .storage
            .prefix_iterator(cf_name, prefix)?
            .into_iter()
            .collect();

        for ((staged_cf, key), op) in self.staged.borrow().iter() {
            if staged_cf != cf_name || !key.starts_with(prefix) {
                continue;
            }
            match op {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }

    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<u64, StorageError> {
        let mut count = self.storage.count_prefix(cf_name, prefix)?;

        for ((staged_cf, key), op) in self.staged.borrow().iter() {
            if staged_cf != cf_name || !key.starts_with(prefix) {
                continue;
            }
            let committed = self.storage.get(cf_name, key)?.is_some();
            match (op.is_some(), committed) {
                (true, false) => count += 1,
                (false, true) => count = count.saturating_sub(1),
                _ => {}
            }
        }

        Ok(count)
    }
}
