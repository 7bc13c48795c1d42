//! Storage layer for the catalog.
//!
//! Provides RocksDB-backed storage with:
//! - Column family isolation per record kind
//! - Zero-padded keys so prefix scans return ids in order
//! - Per-kind id sequences
//! - Serialized write transactions committed as one WriteBatch

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;
pub mod kv;
pub mod transaction;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::{AliasKey, ChildKey, RecordKey, SequenceKey};
pub use kv::KeyValue;
pub use transaction::Transaction;
