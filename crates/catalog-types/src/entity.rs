//! Catalog record types.
//!
//! Records are stored as JSON and returned to callers as-is. Every record
//! carries its creation time, which (with the id as tie-break) defines the
//! rank used to derive its alias.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RecordId;

/// Top-level catalog entry. Alias is globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: RecordId,
    pub name: String,
    /// Bijective base-26 alias (A, B, ... AA)
    pub alias: String,
    pub created_at: DateTime<Utc>,
}

/// Second-level entry, owned by a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: RecordId,
    pub name: String,
    /// Decimal alias, unique among the topic's styles
    pub alias: String,
    pub topic_id: RecordId,
    pub created_at: DateTime<Utc>,
}

/// Third-level entry, owned by a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: RecordId,
    pub name: String,
    /// Roman numeral alias, unique among the style's places
    pub alias: String,
    pub style_id: RecordId,
    pub created_at: DateTime<Utc>,
}

/// Leaf design asset, owned by a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: RecordId,
    pub name: String,
    /// Caller-supplied label. Never generated or renumbered.
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Freeform layout data, opaque to the catalog
    #[serde(default)]
    pub playground: Option<Value>,
    pub place_id: RecordId,
    pub created_at: DateTime<Utc>,
}

/// Item fields supplied at insert time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub alias: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub image_url: Option<String>,
    pub playground: Option<Value>,
    pub place_id: RecordId,
}

/// Request to create a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTopic {
    pub name: String,
}

impl CreateTopic {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Request to create a style under a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStyle {
    pub name: String,
    pub topic_id: RecordId,
}

impl CreateStyle {
    pub fn new(name: impl Into<String>, topic_id: RecordId) -> Self {
        Self {
            name: name.into(),
            topic_id,
        }
    }
}

/// Request to create a place under a style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlace {
    pub name: String,
    pub style_id: RecordId,
}

impl CreatePlace {
    pub fn new(name: impl Into<String>, style_id: RecordId) -> Self {
        Self {
            name: name.into(),
            style_id,
        }
    }
}

/// Request to create an item under a place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItem {
    pub name: String,
    pub place_id: RecordId,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub playground: Option<Value>,
}

impl CreateItem {
    pub fn new(name: impl Into<String>, place_id: RecordId) -> Self {
        Self {
            name: name.into(),
            place_id,
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_playground(mut self, playground: Value) -> Self {
        self.playground = Some(playground);
        self
    }

    /// Convert into the insert record, dropping blank aliases.
    pub fn into_new_item(self) -> NewItem {
        NewItem {
            name: self.name,
            alias: self.alias.filter(|a| !a.trim().is_empty()),
            width: self.width,
            height: self.height,
            image_url: self.image_url,
            playground: self.playground,
            place_id: self.place_id,
        }
    }
}

/// A place with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceTree {
    #[serde(flatten)]
    pub place: Place,
    pub items: Vec<Item>,
}

/// A style with its places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTree {
    #[serde(flatten)]
    pub style: Style,
    pub places: Vec<PlaceTree>,
}

/// A topic with its full subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTree {
    #[serde(flatten)]
    pub topic: Topic,
    pub styles: Vec<StyleTree>,
}
