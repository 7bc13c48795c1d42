//! Key-value access shared by [`crate::Storage`] and [`crate::Transaction`].
//!
//! Higher layers are written once against [`KeyValue`] and run either
//! directly on storage (reads) or inside a write transaction.

use std::sync::Arc;

use crate::column_families::CF_SEQUENCES;
use crate::error::StorageError;
use crate::keys::SequenceKey;

/// Column-family scoped key-value operations.
pub trait KeyValue {
    /// Get a value from a column family.
    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a value into a column family.
    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete a value from a column family.
    fn delete(&self, cf_name: &str, key: &[u8]) -> Result<(), StorageError>;

    /// All entries whose key starts with `prefix`, in key order.
    fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;

    /// Number of keys starting with `prefix`.
    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<u64, StorageError> {
        Ok(self.prefix_iterator(cf_name, prefix)?.len() as u64)
    }

    /// Allocate the next value of a named sequence, starting at 1.
    ///
    /// Read-then-write: only unique when called inside a [`crate::Transaction`].
    fn next_sequence(&self, name: &str) -> Result<u64, StorageError> {
        let key = SequenceKey::new(name).to_bytes();
        let current = match self.get(CF_SEQUENCES, &key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::Serialization(format!("Corrupt sequence value for {}", name))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.put(CF_SEQUENCES, &key, &next.to_be_bytes())?;
        Ok(next)
    }
}

impl<T: KeyValue + ?Sized> KeyValue for &T {
    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(cf_name, key)
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).put(cf_name, key, value)
    }

    fn delete(&self, cf_name: &str, key: &[u8]) -> Result<(), StorageError> {
        (**self).delete(cf_name, key)
    }

    fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        (**self).prefix_iterator(cf_name, prefix)
    }

    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<u64, StorageError> {
        (**self).count_prefix(cf_name, prefix)
    }

    fn next_sequence(&self, name: &str) -> Result<u64, StorageError> {
        (**self).next_sequence(name)
    }
}

impl<T: KeyValue + ?Sized> KeyValue for Arc<T> {
    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(cf_name, key)
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).put(cf_name, key, value)
    }

    fn delete(&self, cf_name: &str, key: &[u8]) -> Result<(), StorageError> {
        (**self).delete(cf_name, key)
    }

    fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        (**self).prefix_iterator(cf_name, prefix)
    }

    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<u64, StorageError> {
        (**self).count_prefix(cf_name, prefix)
    }

    fn next_sequence(&self, name: &str) -> Result<u64, StorageError> {
        (**self).next_sequence(name)
    }
}
