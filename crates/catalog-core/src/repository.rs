//! Storage contract consumed by the catalog core.
//!
//! The core only needs counting, insertion, ordered retrieval, updates and
//! cascading deletes scoped by parent id. Any backend that can provide these
//! plus an atomic unit of work can host the catalog.

use catalog_types::{Item, NewItem, NewTopicHistory, Place, RecordId, Style, Topic, TopicHistory};
use serde_json::Value;

use crate::error::CatalogError;

/// Per-operation storage contract.
///
/// Listings return records in ascending `(created_at, id)` order.
pub trait CatalogRepository {
    // --- Counting ---

    fn count_topics(&self) -> Result<u64, CatalogError>;
    fn count_styles_under(&self, topic_id: RecordId) -> Result<u64, CatalogError>;
    fn count_places_under(&self, style_id: RecordId) -> Result<u64, CatalogError>;
    fn count_items_under(&self, place_id: RecordId) -> Result<u64, CatalogError>;

    // --- Insertion ---

    /// Insert a topic. Fails with `Conflict` if another topic owns `alias`.
    fn insert_topic(&self, name: &str, alias: &str) -> Result<Topic, CatalogError>;

    /// Insert a style. Fails with `Conflict` if a sibling owns `alias`.
    fn insert_style(&self, name: &str, alias: &str, topic_id: RecordId)
        -> Result<Style, CatalogError>;

    /// Insert a place. Fails with `Conflict` if a sibling owns `alias`.
    fn insert_place(&self, name: &str, alias: &str, style_id: RecordId)
        -> Result<Place, CatalogError>;

    fn insert_item(&self, item: NewItem) -> Result<Item, CatalogError>;

    // --- Lookup ---

    fn get_topic_by_id(&self, id: RecordId) -> Result<Option<Topic>, CatalogError>;
    fn get_style_by_id(&self, id: RecordId) -> Result<Option<Style>, CatalogError>;
    fn get_place_by_id(&self, id: RecordId) -> Result<Option<Place>, CatalogError>;
    fn get_item_by_id(&self, id: RecordId) -> Result<Option<Item>, CatalogError>;

    // --- Ordered retrieval ---

    fn list_topics_ordered_by_creation(&self) -> Result<Vec<Topic>, CatalogError>;
    fn list_styles_under(&self, topic_id: RecordId) -> Result<Vec<Style>, CatalogError>;
    fn list_places_under(&self, style_id: RecordId) -> Result<Vec<Place>, CatalogError>;
    fn list_items_under(&self, place_id: RecordId) -> Result<Vec<Item>, CatalogError>;

    // --- Mutation ---

    /// Move a topic to `new_alias`. Fails with `Conflict` if another topic
    /// owns it and with `NotFound` if the topic is gone.
    fn update_topic_alias(&self, id: RecordId, new_alias: &str) -> Result<(), CatalogError>;

    /// Move several topics at once. Old aliases are released before new
    /// ones are claimed, so the batch may swap aliases between its topics.
    /// Fails with `Conflict` if a new alias is held outside the batch or
    /// claimed twice.
    fn update_topic_aliases(&self, updates: &[(RecordId, &str)]) -> Result<(), CatalogError>;

    /// Replace an item's playground. Returns `None` if the item is gone.
    fn update_item_playground(
        &self,
        id: RecordId,
        playground: Value,
    ) -> Result<Option<Item>, CatalogError>;

    /// Delete a topic and every style, place and item beneath it.
    fn delete_topic_cascade(&self, id: RecordId) -> Result<(), CatalogError>;

    /// Delete one item. Returns false if it did not exist.
    fn delete_item(&self, id: RecordId) -> Result<bool, CatalogError>;

    // --- Audit log ---

    fn insert_topic_history(&self, record: NewTopicHistory) -> Result<TopicHistory, CatalogError>;

    /// Every history row in append order.
    fn list_topic_history(&self) -> Result<Vec<TopicHistory>, CatalogError>;
}

/// A repository that can run several operations as one atomic unit.
pub trait TransactionalRepository: CatalogRepository {
    /// Run `work` against a transactional view of the repository.
    ///
    /// Units are serialized against each other. If `work` returns an error
    /// nothing it wrote is persisted; otherwise all of it is.
    fn transaction<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&dyn CatalogRepository) -> Result<T, CatalogError>;
}
