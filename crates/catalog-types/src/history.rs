//! Topic audit log records.
//!
//! History rows are append-only: one DELETED row per topic deletion and
//! one REINDEXED row per topic whose alias actually changed during a
//! renumbering pass. Rows are never updated or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::entity::Topic;
use crate::RecordId;

/// Kind of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEvent {
    /// Topic was removed (children cascade without their own rows)
    Deleted,
    /// Topic alias was renumbered after a deletion
    Reindexed,
}

impl std::fmt::Display for HistoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryEvent::Deleted => write!(f, "DELETED"),
            HistoryEvent::Reindexed => write!(f, "REINDEXED"),
        }
    }
}

/// A persisted audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicHistory {
    pub id: RecordId,
    /// Subject topic. The topic itself may no longer exist.
    pub topic_id: Option<RecordId>,
    pub topic_name: String,
    pub event: HistoryEvent,
    pub old_alias: String,
    /// None for DELETED rows
    pub new_alias: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

/// An audit row before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTopicHistory {
    pub topic_id: Option<RecordId>,
    pub topic_name: String,
    pub event: HistoryEvent,
    pub old_alias: String,
    pub new_alias: Option<String>,
    pub details: Value,
}

impl NewTopicHistory {
    /// Row recording the deletion of `topic`.
    pub fn deleted(topic: &Topic, at: DateTime<Utc>) -> Self {
        Self {
            topic_id: Some(topic.id),
            topic_name: topic.name.clone(),
            event: HistoryEvent::Deleted,
            old_alias: topic.alias.clone(),
            new_alias: None,
            details: json!({ "timestamp": at.to_rfc3339() }),
        }
    }

    /// Row recording that `topic` moved from `old_alias` to `new_alias`.
    pub fn reindexed(
        topic_id: RecordId,
        topic_name: &str,
        old_alias: &str,
        new_alias: &str,
        reason: &str,
    ) -> Self {
        Self {
            topic_id: Some(topic_id),
            topic_name: topic_name.to_string(),
            event: HistoryEvent::Reindexed,
            old_alias: old_alias.to_string(),
            new_alias: Some(new_alias.to_string()),
            details: json!({ "reason": reason }),
        }
    }

    /// Attach an id and timestamp.
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> TopicHistory {
        TopicHistory {
            id,
            topic_id: self.topic_id,
            topic_name: self.topic_name,
            event: self.event,
            old_alias: self.old_alias,
            new_alias: self.new_alias,
            details: self.details,
            created_at,
        }
    }
}
