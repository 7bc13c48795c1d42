//! Topic deletion and alias renumbering.
//!
//! [`renumber`] is the pure half: given siblings in rank order and an
//! encoder, it returns the aliases that need to move. [`ReindexEngine`]
//! applies it to topics through a [`CatalogRepository`] and writes the
//! audit trail.

use catalog_types::{
    alias, CatalogLevel, NewTopicHistory, Place, RecordId, ReindexSettings, Style, Topic,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::CatalogError;
use crate::repository::CatalogRepository;

const DELETED_AND_REINDEXED: &str = "Topic deleted and aliases re-indexed";
const DELETED_ONLY: &str = "Topic deleted";

/// A record whose alias is derived from its rank among siblings.
pub trait Aliased {
    fn id(&self) -> RecordId;
    fn name(&self) -> &str;
    fn alias(&self) -> &str;
}

impl Aliased for Topic {
    fn id(&self) -> RecordId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn alias(&self) -> &str {
        &self.alias
    }
}

impl Aliased for Style {
    fn id(&self) -> RecordId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn alias(&self) -> &str {
        &self.alias
    }
}

impl Aliased for Place {
    fn id(&self) -> RecordId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn alias(&self) -> &str {
        &self.alias
    }
}

/// One alias that must move to match its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasChange {
    pub id: RecordId,
    pub name: String,
    pub old_alias: String,
    pub new_alias: String,
    /// 1-based position among siblings
    pub rank: i64,
}

/// Compute the alias changes that make `siblings` contiguous.
///
/// `siblings` must already be in rank order. Records whose alias already
/// matches `encode(rank)` produce no change.
pub fn renumber<T, F>(siblings: &[T], encode: F) -> Vec<AliasChange>
where
    T: Aliased,
    F: Fn(i64) -> String,
{
    siblings
        .iter()
        .zip(1i64..)
        .filter_map(|(sibling, rank)| {
            let new_alias = encode(rank);
            if new_alias == sibling.alias() {
                return None;
            }
            Some(AliasChange {
                id: sibling.id(),
                name: sibling.name().to_string(),
                old_alias: sibling.alias().to_string(),
                new_alias,
                rank,
            })
        })
        .collect()
}

/// Result of deleting a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDeletion {
    pub message: String,
    pub deleted: Topic,
    pub changes: Vec<AliasChange>,
}

/// Deletes topics and keeps the surviving topic aliases gap-free.
#[derive(Debug, Clone)]
pub struct ReindexEngine {
    reason: String,
    enabled: bool,
}

impl Default for ReindexEngine {
    fn default() -> Self {
        Self::from_settings(&ReindexSettings::default())
    }
}

impl ReindexEngine {
    pub fn new(reason: impl Into<String>, enabled: bool) -> Self {
        Self {
            reason: reason.into(),
            enabled,
        }
    }

    pub fn from_settings(settings: &ReindexSettings) -> Self {
        Self::new(settings.reason.clone(), settings.enabled)
    }

    /// Reason recorded on each REINDEXED row.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bring every topic alias in line with its creation rank.
    ///
    /// All aliases move in one batch, so surviving topics may trade aliases
    /// with each other. One REINDEXED row per change follows, in rank order.
    #[instrument(skip(self, repo))]
    pub fn reindex_topics(
        &self,
        repo: &dyn CatalogRepository,
    ) -> Result<Vec<AliasChange>, CatalogError> {
        let topics = repo.list_topics_ordered_by_creation()?;
        let changes = renumber(&topics, alias::base26);
        if changes.is_empty() {
            debug!(topics = topics.len(), "Topic aliases already contiguous");
            return Ok(changes);
        }

        let moves: Vec<(RecordId, &str)> = changes
            .iter()
            .map(|change| (change.id, change.new_alias.as_str()))
            .collect();
        repo.update_topic_aliases(&moves)?;

        for change in &changes {
            repo.insert_topic_history(NewTopicHistory::reindexed(
                change.id,
                &change.name,
                &change.old_alias,
                &change.new_alias,
                &self.reason,
            ))?;
            debug!(
                topic_id = change.id,
                old_alias = %change.old_alias,
                new_alias = %change.new_alias,
                "Re-aliased topic"
            );
        }

        info!(topics = topics.len(), changes = changes.len(), "Topic reindex complete");
        Ok(changes)
    }

    /// Delete a topic and its subtree, then renumber the survivors.
    ///
    /// The DELETED row is written before the delete. Run this inside a
    /// transaction to make the whole sequence atomic.
    #[instrument(skip(self, repo))]
    pub fn delete_topic(
        &self,
        repo: &dyn CatalogRepository,
        id: RecordId,
    ) -> Result<TopicDeletion, CatalogError> {
        let topic = repo
            .get_topic_by_id(id)?
            .ok_or_else(|| CatalogError::not_found(CatalogLevel::Topic, id))?;

        repo.insert_topic_history(NewTopicHistory::deleted(&topic, Utc::now()))?;
        repo.delete_topic_cascade(id)?;
        info!(topic_id = id, alias = %topic.alias, "Deleted topic");

        let (message, changes) = if self.enabled {
            (DELETED_AND_REINDEXED, self.reindex_topics(repo)?)
        } else {
            (DELETED_ONLY, Vec::new())
        };

        Ok(TopicDeletion {
            message: message.to_string(),
            deleted: topic,
            changes,
        })
    }
}
