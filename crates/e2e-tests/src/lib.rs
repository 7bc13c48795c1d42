//! End-to-end test infrastructure for the catalog.
//!
//! Provides a shared TestHarness over real on-disk storage and helpers for
//! seeding hierarchies.

use std::sync::Arc;

use catalog_core::{CatalogService, CatalogStore};
use catalog_storage::Storage;
use catalog_types::{alias, CreateItem, CreatePlace, CreateStyle, CreateTopic, Item, Place, Style, Topic};

pub type Service = CatalogService<CatalogStore<Arc<Storage>>>;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared storage instance
    pub storage: Arc<Storage>,
    /// Service over `storage` with default reindex settings
    pub service: Service,
}

impl TestHarness {
    /// Create a new test harness with temp directory and storage.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage =
            Arc::new(Storage::open(temp_dir.path()).expect("Failed to open test storage"));
        let service = CatalogService::new(CatalogStore::new(storage.clone()));

        Self {
            _temp_dir: temp_dir,
            storage,
            service,
        }
    }

    /// A second service sharing this harness's storage.
    pub fn second_service(&self) -> Service {
        CatalogService::new(CatalogStore::new(self.storage.clone()))
    }

    /// Create `count` topics named "Topic 1".."Topic N".
    pub fn seed_topics(&self, count: usize) -> Vec<Topic> {
        (1..=count)
            .map(|i| {
                self.service
                    .create_topic(CreateTopic::new(format!("Topic {}", i)))
                    .expect("Failed to create topic")
            })
            .collect()
    }

    /// Build `styles` x `places` x `items` beneath a topic.
    pub fn seed_subtree(
        &self,
        topic_id: u64,
        styles: usize,
        places: usize,
        items: usize,
    ) -> Subtree {
        let mut subtree = Subtree::default();

        for s in 0..styles {
            let style = self
                .service
                .create_style(CreateStyle::new(format!("Style {}", s + 1), topic_id))
                .expect("Failed to create style");

            for p in 0..places {
                let place = self
                    .service
                    .create_place(CreatePlace::new(format!("Place {}", p + 1), style.id))
                    .expect("Failed to create place");

                for i in 0..items {
                    let item = self
                        .service
                        .create_item(CreateItem::new(format!("Item {}", i + 1), place.id))
                        .expect("Failed to create item");
                    subtree.items.push(item);
                }
                subtree.places.push(place);
            }
            subtree.styles.push(style);
        }

        subtree
    }

    /// Current topic aliases in creation order.
    pub fn topic_aliases(&self) -> Vec<String> {
        self.service
            .list_topics()
            .expect("Failed to list topics")
            .into_iter()
            .map(|t| t.alias)
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Records created by [`TestHarness::seed_subtree`].
#[derive(Debug, Default)]
pub struct Subtree {
    pub styles: Vec<Style>,
    pub places: Vec<Place>,
    pub items: Vec<Item>,
}

/// Rank encoded by a topic alias: "A" -> 1, "Z" -> 26, "AA" -> 27.
pub fn decode_base26(alias: &str) -> i64 {
    alias::base26_rank(alias).expect("Not a base-26 alias")
}
