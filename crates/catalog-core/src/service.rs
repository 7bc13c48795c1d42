//! Catalog orchestration.
//!
//! Every mutating operation runs as one repository transaction, so the
//! sibling count and the insert that depends on it cannot interleave with
//! another writer.

use catalog_types::{
    alias, CatalogLevel, CatalogTree, CreateItem, CreatePlace, CreateStyle, CreateTopic, Item, Place,
    PlaceTree, RecordId, Style, StyleTree, Topic, TopicHistory,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::CatalogError;
use crate::reindex::{AliasChange, ReindexEngine, TopicDeletion};
use crate::repository::{CatalogRepository, TransactionalRepository};

/// Result of deleting an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDeletion {
    pub message: String,
    pub item: Item,
}

/// Create, read and delete operations across the catalog hierarchy.
pub struct CatalogService<R> {
    repo: R,
    engine: ReindexEngine,
}

impl<R: TransactionalRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_engine(repo, ReindexEngine::default())
    }

    pub fn with_engine(repo: R, engine: ReindexEngine) -> Self {
        Self { repo, engine }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn engine(&self) -> &ReindexEngine {
        &self.engine
    }

    // ===== Creation =====

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create_topic(&self, request: CreateTopic) -> Result<Topic, CatalogError> {
        let name = validate_name(CatalogLevel::Topic, &request.name)?;

        let topic = self.repo.transaction(|repo| {
            let rank = self.next_topic_rank(repo)?;
            repo.insert_topic(&name, &encode(CatalogLevel::Topic, rank))
        })?;

        info!(topic_id = topic.id, alias = %topic.alias, "Created topic");
        Ok(topic)
    }

    #[instrument(skip(self, request), fields(name = %request.name, topic_id = request.topic_id))]
    pub fn create_style(&self, request: CreateStyle) -> Result<Style, CatalogError> {
        let name = validate_name(CatalogLevel::Style, &request.name)?;

        let style = self.repo.transaction(|repo| {
            require_topic(repo, request.topic_id)?;
            let rank = repo.count_styles_under(request.topic_id)? as i64 + 1;
            repo.insert_style(&name, &encode(CatalogLevel::Style, rank), request.topic_id)
        })?;

        info!(style_id = style.id, alias = %style.alias, "Created style");
        Ok(style)
    }

    #[instrument(skip(self, request), fields(name = %request.name, style_id = request.style_id))]
    pub fn create_place(&self, request: CreatePlace) -> Result<Place, CatalogError> {
        let name = validate_name(CatalogLevel::Place, &request.name)?;

        let place = self.repo.transaction(|repo| {
            if repo.get_style_by_id(request.style_id)?.is_none() {
                return Err(CatalogError::not_found(
                    CatalogLevel::Style,
                    request.style_id,
                ));
            }
            let rank = repo.count_places_under(request.style_id)? as i64 + 1;
            repo.insert_place(&name, &encode(CatalogLevel::Place, rank), request.style_id)
        })?;

        info!(place_id = place.id, alias = %place.alias, "Created place");
        Ok(place)
    }

    /// Create an item. Its alias is whatever the caller supplied, if anything.
    #[instrument(skip(self, request), fields(name = %request.name, place_id = request.place_id))]
    pub fn create_item(&self, request: CreateItem) -> Result<Item, CatalogError> {
        let name = validate_name(CatalogLevel::Item, &request.name)?;
        let mut new_item = request.into_new_item();
        new_item.name = name;

        let item = self.repo.transaction(|repo| {
            if repo.get_place_by_id(new_item.place_id)?.is_none() {
                return Err(CatalogError::not_found(
                    CatalogLevel::Place,
                    new_item.place_id,
                ));
            }
            repo.insert_item(new_item)
        })?;

        info!(item_id = item.id, "Created item");
        Ok(item)
    }

    /// Rank for the next topic. With renumbering off, deletions leave gaps
    /// and the count no longer points past the last alias, so the highest
    /// alias in use sets the floor.
    fn next_topic_rank(&self, repo: &dyn CatalogRepository) -> Result<i64, CatalogError> {
        let count = repo.count_topics()? as i64;
        if self.engine.is_enabled() {
            return Ok(count + 1);
        }

        let highest = repo
            .list_topics_ordered_by_creation()?
            .iter()
            .filter_map(|topic| alias::base26_rank(&topic.alias))
            .max()
            .unwrap_or(0);
        Ok(count.max(highest) + 1)
    }

    // ===== Reads =====

    /// Topics in creation order.
    pub fn list_topics(&self) -> Result<Vec<Topic>, CatalogError> {
        self.repo.list_topics_ordered_by_creation()
    }

    pub fn get_topic(&self, id: RecordId) -> Result<Topic, CatalogError> {
        self.repo
            .get_topic_by_id(id)?
            .ok_or_else(|| CatalogError::not_found(CatalogLevel::Topic, id))
    }

    pub fn get_item(&self, id: RecordId) -> Result<Item, CatalogError> {
        self.repo
            .get_item_by_id(id)?
            .ok_or_else(|| CatalogError::not_found(CatalogLevel::Item, id))
    }

    /// The whole catalog as nested trees, every level in creation order.
    ///
    /// Read under the write lock so the tree is a consistent snapshot.
    #[instrument(skip(self))]
    pub fn catalog_tree(&self) -> Result<Vec<CatalogTree>, CatalogError> {
        self.repo.transaction(|repo| {
            let mut trees = Vec::new();
            for topic in repo.list_topics_ordered_by_creation()? {
                let mut styles = Vec::new();
                for style in repo.list_styles_under(topic.id)? {
                    let mut places = Vec::new();
                    for place in repo.list_places_under(style.id)? {
                        let items = repo.list_items_under(place.id)?;
                        places.push(PlaceTree { place, items });
                    }
                    styles.push(StyleTree { style, places });
                }
                trees.push(CatalogTree { topic, styles });
            }
            Ok(trees)
        })
    }

    /// Audit log in append order, optionally for a single topic.
    pub fn topic_history(
        &self,
        topic_id: Option<RecordId>,
    ) -> Result<Vec<TopicHistory>, CatalogError> {
        let rows = self.repo.list_topic_history()?;
        Ok(match topic_id {
            Some(id) => rows
                .into_iter()
                .filter(|row| row.topic_id == Some(id))
                .collect(),
            None => rows,
        })
    }

    // ===== Mutation =====

    /// Delete a topic with its subtree and renumber the remaining topics.
    #[instrument(skip(self))]
    pub fn delete_topic(&self, id: RecordId) -> Result<TopicDeletion, CatalogError> {
        let deletion = self
            .repo
            .transaction(|repo| self.engine.delete_topic(repo, id))?;

        info!(
            topic_id = id,
            changes = deletion.changes.len(),
            "{}",
            deletion.message
        );
        Ok(deletion)
    }

    /// Run the topic renumbering pass on demand.
    #[instrument(skip(self))]
    pub fn reindex_topics(&self) -> Result<Vec<AliasChange>, CatalogError> {
        self.repo
            .transaction(|repo| self.engine.reindex_topics(repo))
    }

    #[instrument(skip(self, playground))]
    pub fn update_item_playground(
        &self,
        id: RecordId,
        playground: Value,
    ) -> Result<Item, CatalogError> {
        self.repo.transaction(|repo| {
            repo.update_item_playground(id, playground)?
                .ok_or_else(|| CatalogError::not_found(CatalogLevel::Item, id))
        })
    }

    /// Delete one item. Sibling aliases are left as they are.
    #[instrument(skip(self))]
    pub fn delete_item(&self, id: RecordId) -> Result<ItemDeletion, CatalogError> {
        let item = self.repo.transaction(|repo| {
            let item = repo
                .get_item_by_id(id)?
                .ok_or_else(|| CatalogError::not_found(CatalogLevel::Item, id))?;
            repo.delete_item(id)?;
            Ok(item)
        })?;

        info!(item_id = id, "Deleted item");
        Ok(ItemDeletion {
            message: "Item deleted".to_string(),
            item,
        })
    }
}

fn require_topic(repo: &dyn CatalogRepository, id: RecordId) -> Result<(), CatalogError> {
    match repo.get_topic_by_id(id)? {
        Some(_) => Ok(()),
        None => Err(CatalogError::not_found(CatalogLevel::Topic, id)),
    }
}

fn encode(level: CatalogLevel, rank: i64) -> String {
    level
        .scheme()
        .map(|scheme| scheme.encode(rank))
        .unwrap_or_default()
}

/// Trimmed, non-blank name.
fn validate_name(level: CatalogLevel, name: &str) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidInput(format!(
            "{} name must not be blank",
            level
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;
    use catalog_storage::Storage;
    use catalog_types::HistoryEvent;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestService = CatalogService<CatalogStore<Arc<Storage>>>;

    fn create_test_service() -> (TestService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
        (CatalogService::new(CatalogStore::new(storage)), temp_dir)
    }

    #[test]
    fn test_topics_get_sequential_letters() {
        let (service, _temp) = create_test_service();
        let aliases: Vec<String> = (0..5)
            .map(|i| {
                service
                    .create_topic(CreateTopic::new(format!("Topic {}", i)))
                    .unwrap()
                    .alias
            })
            .collect();
        assert_eq!(aliases, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_level_encoders() {
        let (service, _temp) = create_test_service();
        let topic = service.create_topic(CreateTopic::new("Botanical")).unwrap();

        let s1 = service.create_style(CreateStyle::new("Flat", topic.id)).unwrap();
        let s2 = service.create_style(CreateStyle::new("Line", topic.id)).unwrap();
        assert_eq!((s1.alias.as_str(), s2.alias.as_str()), ("1", "2"));

        let places: Vec<String> = (0..4)
            .map(|i| {
                service
                    .create_place(CreatePlace::new(format!("Place {}", i), s1.id))
                    .unwrap()
                    .alias
            })
            .collect();
        assert_eq!(places, vec!["I", "II", "III", "IV"]);

        // Ranks are per parent
        let other = service.create_place(CreatePlace::new("Elsewhere", s2.id)).unwrap();
        assert_eq!(other.alias, "I");
    }

    #[test]
    fn test_create_style_missing_topic() {
        let (service, _temp) = create_test_service();
        let err = service.create_style(CreateStyle::new("Flat", 99)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Topic not found: 99");
        assert_eq!(service.repository().count_styles_under(99).unwrap(), 0);
    }

    #[test]
    fn test_create_place_and_item_missing_parent() {
        let (service, _temp) = create_test_service();
        let err = service.create_place(CreatePlace::new("North", 5)).unwrap_err();
        assert_eq!(err.to_string(), "Style not found: 5");

        let err = service.create_item(CreateItem::new("Poster", 6)).unwrap_err();
        assert_eq!(err.to_string(), "Place not found: 6");
    }

    #[test]
    fn test_blank_name_rejected() {
        let (service, _temp) = create_test_service();
        let err = service.create_topic(CreateTopic::new("   ")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
        assert_eq!(service.list_topics().unwrap().len(), 0);

        let topic = service.create_topic(CreateTopic::new("  Padded ")).unwrap();
        assert_eq!(topic.name, "Padded");
    }

    #[test]
    fn test_item_alias_is_caller_supplied() {
        let (service, _temp) = create_test_service();
        let topic = service.create_topic(CreateTopic::new("T")).unwrap();
        let style = service.create_style(CreateStyle::new("S", topic.id)).unwrap();
        let place = service.create_place(CreatePlace::new("P", style.id)).unwrap();

        let plain = service.create_item(CreateItem::new("Plain", place.id)).unwrap();
        assert_eq!(plain.alias, None);

        let named = service
            .create_item(
                CreateItem::new("Named", place.id)
                    .with_alias("hero")
                    .with_size(1920.0, 1080.0),
            )
            .unwrap();
        assert_eq!(named.alias.as_deref(), Some("hero"));
        assert_eq!(named.width, Some(1920.0));
    }

    #[test]
    fn test_item_playground_and_delete() {
        let (service, _temp) = create_test_service();
        let topic = service.create_topic(CreateTopic::new("T")).unwrap();
        let style = service.create_style(CreateStyle::new("S", topic.id)).unwrap();
        let place = service.create_place(CreatePlace::new("P", style.id)).unwrap();
        let first = service.create_item(CreateItem::new("One", place.id).with_alias("1")).unwrap();
        let second = service.create_item(CreateItem::new("Two", place.id).with_alias("2")).unwrap();

        let updated = service
            .update_item_playground(second.id, json!({"layers": [1, 2]}))
            .unwrap();
        assert_eq!(updated.playground, Some(json!({"layers": [1, 2]})));

        let deletion = service.delete_item(first.id).unwrap();
        assert_eq!(deletion.message, "Item deleted");
        assert_eq!(deletion.item.id, first.id);

        // Sibling keeps its alias
        assert_eq!(service.get_item(second.id).unwrap().alias.as_deref(), Some("2"));
        assert!(service.get_item(first.id).unwrap_err().is_not_found());
        assert!(service.delete_item(first.id).unwrap_err().is_not_found());
        assert!(service
            .update_item_playground(first.id, json!({}))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_middle_topic_through_service() {
        let (service, _temp) = create_test_service();
        let topics: Vec<Topic> = ["One", "Two", "Three"]
            .iter()
            .map(|name| service.create_topic(CreateTopic::new(*name)).unwrap())
            .collect();

        let deletion = service.delete_topic(topics[1].id).unwrap();
        assert_eq!(deletion.message, "Topic deleted and aliases re-indexed");

        let remaining: Vec<(String, String)> = service
            .list_topics()
            .unwrap()
            .into_iter()
            .map(|t| (t.name, t.alias))
            .collect();
        assert_eq!(
            remaining,
            vec![
                ("One".to_string(), "A".to_string()),
                ("Three".to_string(), "B".to_string())
            ]
        );

        // New topics continue from the compacted count
        let next = service.create_topic(CreateTopic::new("Four")).unwrap();
        assert_eq!(next.alias, "C");
    }

    #[test]
    fn test_create_without_reindex_skips_used_aliases() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
        let service = CatalogService::with_engine(
            CatalogStore::new(storage),
            ReindexEngine::new("unused", false),
        );
        let topics: Vec<Topic> = ["One", "Two", "Three"]
            .iter()
            .map(|name| service.create_topic(CreateTopic::new(*name)).unwrap())
            .collect();

        service.delete_topic(topics[1].id).unwrap();
        let next = service.create_topic(CreateTopic::new("Four")).unwrap();
        assert_eq!(next.alias, "D");

        service.delete_topic(next.id).unwrap();
        service.delete_topic(topics[0].id).unwrap();
        // Only "C" remains, so the next free letter is "D" again
        let last = service.create_topic(CreateTopic::new("Five")).unwrap();
        assert_eq!(last.alias, "D");
    }

    #[test]
    fn test_topic_deletion_does_not_renumber_children() {
        let (service, _temp) = create_test_service();
        let keep = service.create_topic(CreateTopic::new("Keep")).unwrap();
        let s1 = service.create_style(CreateStyle::new("S1", keep.id)).unwrap();
        let s2 = service.create_style(CreateStyle::new("S2", keep.id)).unwrap();
        let doomed = service.create_topic(CreateTopic::new("Doomed")).unwrap();
        service.create_style(CreateStyle::new("S", doomed.id)).unwrap();

        service.delete_topic(doomed.id).unwrap();

        let tree = service.catalog_tree().unwrap();
        assert_eq!(tree.len(), 1);
        let aliases: Vec<&str> = tree[0].styles.iter().map(|s| s.style.alias.as_str()).collect();
        assert_eq!(aliases, vec![s1.alias.as_str(), s2.alias.as_str()]);
    }

    #[test]
    fn test_topic_history_filter() {
        let (service, _temp) = create_test_service();
        let a = service.create_topic(CreateTopic::new("A")).unwrap();
        let b = service.create_topic(CreateTopic::new("B")).unwrap();
        let c = service.create_topic(CreateTopic::new("C")).unwrap();

        service.delete_topic(a.id).unwrap();

        assert_eq!(service.topic_history(None).unwrap().len(), 3);

        let for_c = service.topic_history(Some(c.id)).unwrap();
        assert_eq!(for_c.len(), 1);
        assert_eq!(for_c[0].event, HistoryEvent::Reindexed);
        assert_eq!(for_c[0].old_alias, "C");

        let for_a = service.topic_history(Some(a.id)).unwrap();
        assert_eq!(for_a[0].event, HistoryEvent::Deleted);
        assert_eq!(service.topic_history(Some(b.id)).unwrap().len(), 1);
    }

    #[test]
    fn test_catalog_tree_nesting() {
        let (service, _temp) = create_test_service();
        let topic = service.create_topic(CreateTopic::new("T")).unwrap();
        let style = service.create_style(CreateStyle::new("S", topic.id)).unwrap();
        let place = service.create_place(CreatePlace::new("P", style.id)).unwrap();
        service.create_item(CreateItem::new("I", place.id)).unwrap();

        let tree = service.catalog_tree().unwrap();
        assert_eq!(tree[0].topic.id, topic.id);
        assert_eq!(tree[0].styles[0].places[0].place.id, place.id);
        assert_eq!(tree[0].styles[0].places[0].items.len(), 1);
    }
}
