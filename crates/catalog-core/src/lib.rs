//! # catalog-core
//!
//! Alias assignment and re-indexing for the Topic -> Style -> Place -> Item
//! catalog.
//!
//! ## Components
//! - [`CatalogRepository`]: storage contract consumed by the core
//! - [`CatalogStore`]: RocksDB-backed repository with serialized transactions
//! - [`ReindexEngine`]: topic deletion and alias renumbering with audit trail
//! - [`CatalogService`]: create/read/delete orchestration per level
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use catalog_core::{CatalogService, CatalogStore};
//! use catalog_storage::Storage;
//! use catalog_types::CreateTopic;
//!
//! let storage = Arc::new(Storage::open(path)?);
//! let service = CatalogService::new(CatalogStore::new(storage));
//! let topic = service.create_topic(CreateTopic::new("Botanical"))?;
//! assert_eq!(topic.alias, "A");
//! ```

pub mod error;
pub mod reindex;
pub mod repository;
pub mod service;
pub mod store;

pub use error::CatalogError;
pub use reindex::{renumber, AliasChange, Aliased, ReindexEngine, TopicDeletion};
pub use repository::{CatalogRepository, TransactionalRepository};
pub use service::{CatalogService, ItemDeletion};
pub use store::CatalogStore;
