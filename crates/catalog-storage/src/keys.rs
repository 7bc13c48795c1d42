//! Key encoding and decoding for storage layer.
//!
//! Key formats:
//! - record: `{kind}:{id:020}`
//! - child index: `{parent_kind}:{parent_id:020}:{child_id:020}`
//! - alias index: `alias:{scope}:{alias}`
//! - sequence: `seq:{kind}`
//!
//! Ids are zero-padded to 20 digits so lexicographic order matches numeric
//! order and prefix scans return records in allocation order.

use crate::error::StorageError;

/// Key for a primary record.
/// Format: {kind}:{id:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub kind: &'static str,
    pub id: u64,
}

impl RecordKey {
    pub fn new(kind: &'static str, id: u64) -> Self {
        Self { kind, id }
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}:{:020}", self.kind, self.id).into_bytes()
    }

    /// Prefix shared by every record of `kind`
    pub fn prefix(kind: &str) -> Vec<u8> {
        format!("{}:", kind).into_bytes()
    }

    /// Decode key from bytes, checking the kind
    pub fn from_bytes(kind: &'static str, bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 || parts[0] != kind {
            return Err(StorageError::Key(format!("Invalid {} key format: {}", kind, s)));
        }

        let id: u64 = parts[1]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid id: {}", e)))?;

        Ok(Self { kind, id })
    }
}

/// Index entry linking a parent record to one of its children.
/// Format: {parent_kind}:{parent_id:020}:{child_id:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildKey {
    pub parent_kind: &'static str,
    pub parent_id: u64,
    pub child_id: u64,
}

impl ChildKey {
    pub fn new(parent_kind: &'static str, parent_id: u64, child_id: u64) -> Self {
        Self {
            parent_kind,
            parent_id,
            child_id,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}:{:020}:{:020}",
            self.parent_kind, self.parent_id, self.child_id
        )
        .into_bytes()
    }

    /// Prefix matching every child of one parent
    pub fn prefix(parent_kind: &str, parent_id: u64) -> Vec<u8> {
        format!("{}:{:020}:", parent_kind, parent_id).into_bytes()
    }

    pub fn from_bytes(parent_kind: &'static str, bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != parent_kind {
            return Err(StorageError::Key(format!("Invalid child key format: {}", s)));
        }

        let parent_id: u64 = parts[1]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid parent id: {}", e)))?;
        let child_id: u64 = parts[2]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid child id: {}", e)))?;

        Ok(Self {
            parent_kind,
            parent_id,
            child_id,
        })
    }
}

/// Uniqueness index mapping an alias to the record that owns it.
/// Format: alias:{scope}:{alias}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasKey {
    pub scope: String,
    pub alias: String,
}

impl AliasKey {
    pub fn new(scope: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            alias: alias.into(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("alias:{}:{}", self.scope, self.alias).into_bytes()
    }
}

/// Key for an id sequence counter.
/// Format: seq:{kind}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceKey {
    pub kind: String,
}

impl SequenceKey {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("seq:{}", self.kind).into_bytes()
    }
}
