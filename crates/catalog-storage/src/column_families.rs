//! Column family definitions for RocksDB.
//!
//! Each record kind lives in its own column family:
//! - topics: topic records and the global alias index
//! - styles / places / items: records plus parent -> child index entries
//! - topic_history: append-only audit rows (compressed)
//! - sequences: per-kind id counters

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for topics
pub const CF_TOPICS: &str = "topics";

/// Column family name for styles
pub const CF_STYLES: &str = "styles";

/// Column family name for places
pub const CF_PLACES: &str = "places";

/// Column family name for items
pub const CF_ITEMS: &str = "items";

/// Column family name for the topic audit log
pub const CF_TOPIC_HISTORY: &str = "topic_history";

/// Column family name for id sequences
pub const CF_SEQUENCES: &str = "sequences";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[
    CF_TOPICS,
    CF_STYLES,
    CF_PLACES,
    CF_ITEMS,
    CF_TOPIC_HISTORY,
    CF_SEQUENCES,
];

/// Create column family options for the audit log (append-only, compressed)
fn history_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_TOPICS, Options::default()),
        ColumnFamilyDescriptor::new(CF_STYLES, Options::default()),
        ColumnFamilyDescriptor::new(CF_PLACES, Options::default()),
        ColumnFamilyDescriptor::new(CF_ITEMS, Options::default()),
        ColumnFamilyDescriptor::new(CF_TOPIC_HISTORY, history_options()),
        ColumnFamilyDescriptor::new(CF_SEQUENCES, Options::default()),
    ]
}
