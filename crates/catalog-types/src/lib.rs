//! # catalog-types
//!
//! Shared domain types for the design-asset catalog.
//!
//! The catalog is a four-level hierarchy:
//! - Topics: top level, aliased A, B, ... AA, AB (bijective base-26)
//! - Styles: under a topic, aliased 1, 2, 3
//! - Places: under a style, aliased I, II, III (Roman numerals)
//! - Items: under a place, alias optional and caller supplied
//!
//! Topic deletions are recorded in an append-only [`TopicHistory`] log.
//!
//! ## Usage
//!
//! ```rust
//! use catalog_types::alias;
//!
//! assert_eq!(alias::base26(28), "AB");
//! assert_eq!(alias::roman(1994), "MCMXCIV");
//! ```

pub mod alias;
pub mod config;
pub mod entity;
pub mod error;
pub mod history;

pub use alias::{AliasScheme, CatalogLevel};
pub use config::{ReindexSettings, Settings};
pub use entity::{
    CatalogTree, CreateItem, CreatePlace, CreateStyle, CreateTopic, Item, NewItem, Place,
    PlaceTree, Style, StyleTree, Topic,
};
pub use error::ConfigError;
pub use history::{HistoryEvent, NewTopicHistory, TopicHistory};

/// Numeric identifier shared by every catalog record.
pub type RecordId = u64;
