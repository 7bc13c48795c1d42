//! RocksDB-backed catalog repository.
//!
//! Records are JSON values under `{kind}:{id:020}` keys in their own column
//! family. Each child column family also holds `{parent_kind}:{parent_id}:{child_id}`
//! index entries so children can be listed and counted by prefix scan.
//! Topic aliases are kept unique through `alias:topic:{alias}` entries.

use std::sync::Arc;

use catalog_storage::column_families::{
    CF_ITEMS, CF_PLACES, CF_STYLES, CF_TOPICS, CF_TOPIC_HISTORY,
};
use catalog_storage::{AliasKey, ChildKey, KeyValue, RecordKey, Storage, StorageError};
use catalog_types::{
    CatalogLevel, Item, NewItem, NewTopicHistory, Place, RecordId, Style, Topic, TopicHistory,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::CatalogError;
use crate::repository::{CatalogRepository, TransactionalRepository};

const TOPIC: &str = CatalogLevel::Topic.as_str();
const STYLE: &str = CatalogLevel::Style.as_str();
const PLACE: &str = CatalogLevel::Place.as_str();
const ITEM: &str = CatalogLevel::Item.as_str();
const HISTORY: &str = "history";

/// Catalog repository over any [`KeyValue`] backend.
///
/// `CatalogStore<Arc<Storage>>` is the entry point and supports
/// transactions; inside a transaction the same code runs over the
/// transaction's staged view.
pub struct CatalogStore<K> {
    kv: K,
}

impl<K: KeyValue> CatalogStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Underlying key-value backend.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>, CatalogError> {
        match self.kv.get(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<(), CatalogError> {
        let bytes = serde_json::to_vec(value)?;
        self.kv.put(cf, key, &bytes)?;
        Ok(())
    }

    fn record<T: DeserializeOwned>(
        &self,
        cf: &str,
        kind: &'static str,
        id: RecordId,
    ) -> Result<Option<T>, CatalogError> {
        self.read(cf, &RecordKey::new(kind, id).to_bytes())
    }

    fn count_prefix(&self, cf: &str, prefix: &[u8]) -> Result<u64, CatalogError> {
        Ok(self.kv.count_prefix(cf, prefix)?)
    }

    /// Load every child of one parent via the child index.
    fn children<T: DeserializeOwned>(
        &self,
        cf: &str,
        parent_kind: &'static str,
        parent_id: RecordId,
        child_kind: &'static str,
    ) -> Result<Vec<T>, CatalogError> {
        let prefix = ChildKey::prefix(parent_kind, parent_id);
        let mut children = Vec::new();

        for (key, _) in self.kv.prefix_iterator(cf, &prefix)? {
            let child = ChildKey::from_bytes(parent_kind, &key)?;
            match self.record(cf, child_kind, child.child_id)? {
                Some(record) => children.push(record),
                None => warn!(
                    parent_kind,
                    parent_id,
                    child_id = child.child_id,
                    "Dangling child index entry"
                ),
            }
        }

        Ok(children)
    }

    fn alias_owner(&self, alias: &str) -> Result<Option<RecordId>, CatalogError> {
        let key = AliasKey::new(TOPIC, alias).to_bytes();
        match self.kv.get(CF_TOPICS, &key)? {
            Some(bytes) => {
                let id = std::str::from_utf8(&bytes)
                    .ok()
                    .and_then(|s| s.parse::<RecordId>().ok())
                    .ok_or_else(|| {
                        StorageError::Key(format!("Invalid alias index value for {}", alias))
                    })?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn remove_item(&self, item: &Item) -> Result<(), CatalogError> {
        self.kv
            .delete(CF_ITEMS, &RecordKey::new(ITEM, item.id).to_bytes())?;
        self.kv.delete(
            CF_ITEMS,
            &ChildKey::new(PLACE, item.place_id, item.id).to_bytes(),
        )?;
        Ok(())
    }
}

impl<K: KeyValue> CatalogRepository for CatalogStore<K> {
    fn count_topics(&self) -> Result<u64, CatalogError> {
        self.count_prefix(CF_TOPICS, &RecordKey::prefix(TOPIC))
    }

    fn count_styles_under(&self, topic_id: RecordId) -> Result<u64, CatalogError> {
        self.count_prefix(CF_STYLES, &ChildKey::prefix(TOPIC, topic_id))
    }

    fn count_places_under(&self, style_id: RecordId) -> Result<u64, CatalogError> {
        self.count_prefix(CF_PLACES, &ChildKey::prefix(STYLE, style_id))
    }

    fn count_items_under(&self, place_id: RecordId) -> Result<u64, CatalogError> {
        self.count_prefix(CF_ITEMS, &ChildKey::prefix(PLACE, place_id))
    }

    #[instrument(skip(self))]
    fn insert_topic(&self, name: &str, alias: &str) -> Result<Topic, CatalogError> {
        if let Some(owner) = self.alias_owner(alias)? {
            return Err(CatalogError::Conflict(format!(
                "topic alias {} is already used by topic {}",
                alias, owner
            )));
        }

        let id = self.kv.next_sequence(TOPIC)?;
        let topic = Topic {
            id,
            name: name.to_string(),
            alias: alias.to_string(),
            created_at: Utc::now(),
        };

        self.write(CF_TOPICS, &RecordKey::new(TOPIC, id).to_bytes(), &topic)?;
        self.kv.put(
            CF_TOPICS,
            &AliasKey::new(TOPIC, alias).to_bytes(),
            id.to_string().as_bytes(),
        )?;

        debug!(topic_id = id, "Inserted topic");
        Ok(topic)
    }

    #[instrument(skip(self))]
    fn insert_style(
        &self,
        name: &str,
        alias: &str,
        topic_id: RecordId,
    ) -> Result<Style, CatalogError> {
        if self
            .list_styles_under(topic_id)?
            .iter()
            .any(|s| s.alias == alias)
        {
            return Err(CatalogError::Conflict(format!(
                "style alias {} already exists under topic {}",
                alias, topic_id
            )));
        }

        let id = self.kv.next_sequence(STYLE)?;
        let style = Style {
            id,
            name: name.to_string(),
            alias: alias.to_string(),
            topic_id,
            created_at: Utc::now(),
        };

        self.write(CF_STYLES, &RecordKey::new(STYLE, id).to_bytes(), &style)?;
        self.kv
            .put(CF_STYLES, &ChildKey::new(TOPIC, topic_id, id).to_bytes(), &[])?;

        debug!(style_id = id, "Inserted style");
        Ok(style)
    }

    #[instrument(skip(self))]
    fn insert_place(
        &self,
        name: &str,
        alias: &str,
        style_id: RecordId,
    ) -> Result<Place, CatalogError> {
        if self
            .list_places_under(style_id)?
            .iter()
            .any(|p| p.alias == alias)
        {
            return Err(CatalogError::Conflict(format!(
                "place alias {} already exists under style {}",
                alias, style_id
            )));
        }

        let id = self.kv.next_sequence(PLACE)?;
        let place = Place {
            id,
            name: name.to_string(),
            alias: alias.to_string(),
            style_id,
            created_at: Utc::now(),
        };

        self.write(CF_PLACES, &RecordKey::new(PLACE, id).to_bytes(), &place)?;
        self.kv
            .put(CF_PLACES, &ChildKey::new(STYLE, style_id, id).to_bytes(), &[])?;

        debug!(place_id = id, "Inserted place");
        Ok(place)
    }

    #[instrument(skip(self, item), fields(place_id = item.place_id))]
    fn insert_item(&self, item: NewItem) -> Result<Item, CatalogError> {
        let id = self.kv.next_sequence(ITEM)?;
        let item = Item {
            id,
            name: item.name,
            alias: item.alias,
            width: item.width,
            height: item.height,
            image_url: item.image_url,
            playground: item.playground,
            place_id: item.place_id,
            created_at: Utc::now(),
        };

        self.write(CF_ITEMS, &RecordKey::new(ITEM, id).to_bytes(), &item)?;
        self.kv.put(
            CF_ITEMS,
            &ChildKey::new(PLACE, item.place_id, id).to_bytes(),
            &[],
        )?;

        debug!(item_id = id, "Inserted item");
        Ok(item)
    }

    fn get_topic_by_id(&self, id: RecordId) -> Result<Option<Topic>, CatalogError> {
        self.record(CF_TOPICS, TOPIC, id)
    }

    fn get_style_by_id(&self, id: RecordId) -> Result<Option<Style>, CatalogError> {
        self.record(CF_STYLES, STYLE, id)
    }

    fn get_place_by_id(&self, id: RecordId) -> Result<Option<Place>, CatalogError> {
        self.record(CF_PLACES, PLACE, id)
    }

    fn get_item_by_id(&self, id: RecordId) -> Result<Option<Item>, CatalogError> {
        self.record(CF_ITEMS, ITEM, id)
    }

    fn list_topics_ordered_by_creation(&self) -> Result<Vec<Topic>, CatalogError> {
        let mut topics = Vec::new();
        for (_, value) in self
            .kv
            .prefix_iterator(CF_TOPICS, &RecordKey::prefix(TOPIC))?
        {
            let topic: Topic = serde_json::from_slice(&value)?;
            topics.push(topic);
        }

        // Creation time first, id breaks ties deterministically
        topics.sort_by_key(|t| (t.created_at, t.id));
        Ok(topics)
    }

    fn list_styles_under(&self, topic_id: RecordId) -> Result<Vec<Style>, CatalogError> {
        let mut styles: Vec<Style> = self.children(CF_STYLES, TOPIC, topic_id, STYLE)?;
        styles.sort_by_key(|s| (s.created_at, s.id));
        Ok(styles)
    }

    fn list_places_under(&self, style_id: RecordId) -> Result<Vec<Place>, CatalogError> {
        let mut places: Vec<Place> = self.children(CF_PLACES, STYLE, style_id, PLACE)?;
        places.sort_by_key(|p| (p.created_at, p.id));
        Ok(places)
    }

    fn list_items_under(&self, place_id: RecordId) -> Result<Vec<Item>, CatalogError> {
        let mut items: Vec<Item> = self.children(CF_ITEMS, PLACE, place_id, ITEM)?;
        items.sort_by_key(|i| (i.created_at, i.id));
        Ok(items)
    }

    #[instrument(skip(self))]
    fn update_topic_alias(&self, id: RecordId, new_alias: &str) -> Result<(), CatalogError> {
        self.update_topic_aliases(&[(id, new_alias)])
    }

    #[instrument(skip(self, updates), fields(count = updates.len()))]
    fn update_topic_aliases(&self, updates: &[(RecordId, &str)]) -> Result<(), CatalogError> {
        let mut moving = Vec::with_capacity(updates.len());
        for &(id, new_alias) in updates {
            let topic: Topic = self
                .record(CF_TOPICS, TOPIC, id)?
                .ok_or_else(|| CatalogError::not_found(CatalogLevel::Topic, id))?;
            if topic.alias != new_alias {
                moving.push((topic, new_alias));
            }
        }

        // Release every old alias first so the batch may permute aliases.
        for (topic, _) in &moving {
            if self.alias_owner(&topic.alias)? == Some(topic.id) {
                self.kv
                    .delete(CF_TOPICS, &AliasKey::new(TOPIC, &topic.alias).to_bytes())?;
            }
        }

        for (mut topic, new_alias) in moving {
            if let Some(owner) = self.alias_owner(new_alias)? {
                return Err(CatalogError::Conflict(format!(
                    "topic alias {} is already used by topic {}",
                    new_alias, owner
                )));
            }

            self.kv.put(
                CF_TOPICS,
                &AliasKey::new(TOPIC, new_alias).to_bytes(),
                topic.id.to_string().as_bytes(),
            )?;
            topic.alias = new_alias.to_string();
            self.write(CF_TOPICS, &RecordKey::new(TOPIC, topic.id).to_bytes(), &topic)?;
        }

        Ok(())
    }

    #[instrument(skip(self, playground))]
    fn update_item_playground(
        &self,
        id: RecordId,
        playground: Value,
    ) -> Result<Option<Item>, CatalogError> {
        let key = RecordKey::new(ITEM, id).to_bytes();
        let mut item: Item = match self.read(CF_ITEMS, &key)? {
            Some(item) => item,
            None => return Ok(None),
        };

        item.playground = Some(playground);
        self.write(CF_ITEMS, &key, &item)?;
        Ok(Some(item))
    }

    #[instrument(skip(self))]
    fn delete_topic_cascade(&self, id: RecordId) -> Result<(), CatalogError> {
        let topic: Topic = self
            .record(CF_TOPICS, TOPIC, id)?
            .ok_or_else(|| CatalogError::not_found(CatalogLevel::Topic, id))?;

        let (mut styles, mut places, mut items) = (0usize, 0usize, 0usize);

        for style in self.list_styles_under(id)? {
            for place in self.list_places_under(style.id)? {
                for item in self.list_items_under(place.id)? {
                    self.remove_item(&item)?;
                    items += 1;
                }
                self.kv
                    .delete(CF_PLACES, &RecordKey::new(PLACE, place.id).to_bytes())?;
                self.kv.delete(
                    CF_PLACES,
                    &ChildKey::new(STYLE, style.id, place.id).to_bytes(),
                )?;
                places += 1;
            }
            self.kv
                .delete(CF_STYLES, &RecordKey::new(STYLE, style.id).to_bytes())?;
            self.kv
                .delete(CF_STYLES, &ChildKey::new(TOPIC, id, style.id).to_bytes())?;
            styles += 1;
        }

        self.kv
            .delete(CF_TOPICS, &RecordKey::new(TOPIC, id).to_bytes())?;
        self.kv
            .delete(CF_TOPICS, &AliasKey::new(TOPIC, &topic.alias).to_bytes())?;

        debug!(styles, places, items, "Deleted topic subtree");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_item(&self, id: RecordId) -> Result<bool, CatalogError> {
        match self.get_item_by_id(id)? {
            Some(item) => {
                self.remove_item(&item)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_topic_history(&self, record: NewTopicHistory) -> Result<TopicHistory, CatalogError> {
        let id = self.kv.next_sequence(HISTORY)?;
        let row = record.into_record(id, Utc::now());
        self.write(
            CF_TOPIC_HISTORY,
            &RecordKey::new(HISTORY, id).to_bytes(),
            &row,
        )?;
        debug!(history_id = id, event = %row.event, "Appended topic history");
        Ok(row)
    }

    fn list_topic_history(&self) -> Result<Vec<TopicHistory>, CatalogError> {
        let mut rows = Vec::new();
        for (_, value) in self
            .kv
            .prefix_iterator(CF_TOPIC_HISTORY, &RecordKey::prefix(HISTORY))?
        {
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }
}

impl TransactionalRepository for CatalogStore<Arc<Storage>> {
    fn transaction<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&dyn CatalogRepository) -> Result<T, CatalogError>,
    {
        let txn = self.kv.begin()?;
        let view = CatalogStore::new(&txn);
        // An error drops `txn`, discarding everything staged.
        let out = work(&view)?;
        txn.commit()?;
        Ok(out)
    }
}
