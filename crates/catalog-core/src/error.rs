//! Catalog error types.

use catalog_storage::StorageError;
use catalog_types::{CatalogLevel, RecordId};
use thiserror::Error;

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: CatalogLevel, id: RecordId },

    /// Alias already owned by another record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request rejected before touching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error, propagated unmodified
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored record could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn not_found(entity: CatalogLevel, id: RecordId) -> Self {
        CatalogError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CatalogError::Conflict(_))
    }

    /// HTTP-equivalent status for callers that expose the catalog over HTTP.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::NotFound { .. } => 404,
            CatalogError::Conflict(_) => 409,
            CatalogError::InvalidInput(_) => 400,
            CatalogError::Storage(_) | CatalogError::Serialization(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found(CatalogLevel::Topic, 12);
        assert_eq!(err.to_string(), "Topic not found: 12");
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CatalogError::Conflict("alias A".into()).status_code(), 409);
        assert_eq!(CatalogError::InvalidInput("name".into()).status_code(), 400);
        assert_eq!(
            CatalogError::Storage(StorageError::LockPoisoned).status_code(),
            500
        );
    }
}
