//! Topic deletion and re-indexing E2E tests.
//!
//! Exercises the full path through real storage: history ordering,
//! cascade, gap-free aliases after arbitrary deletions, and atomicity.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use catalog_core::{
    CatalogRepository, CatalogService, CatalogStore, ReindexEngine, TransactionalRepository,
};
use catalog_storage::column_families::CF_TOPICS;
use catalog_storage::{AliasKey, KeyValue};
use catalog_types::{alias, CreateTopic, HistoryEvent};
use e2e_tests::{decode_base26, TestHarness};

#[test]
fn test_delete_middle_of_three() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(3);

    harness.service.delete_topic(topics[1].id).unwrap();

    assert_eq!(harness.topic_aliases(), vec!["A", "B"]);

    let history = harness.service.topic_history(None).unwrap();
    let summary: Vec<(HistoryEvent, String, Option<String>)> = history
        .iter()
        .map(|h| (h.event, h.old_alias.clone(), h.new_alias.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HistoryEvent::Deleted, "B".to_string(), None),
            (HistoryEvent::Reindexed, "C".to_string(), Some("B".to_string())),
        ]
    );
    assert_eq!(history[0].topic_name, "Topic 2");
    assert!(history[0].details["timestamp"].is_string());
}

#[test]
fn test_delete_last_of_three() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(3);

    harness.service.delete_topic(topics[2].id).unwrap();

    assert_eq!(harness.topic_aliases(), vec!["A", "B"]);
    let history = harness.service.topic_history(None).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event, HistoryEvent::Deleted);
}

#[test]
fn test_delete_first_shifts_everything() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(4);

    let deletion = harness.service.delete_topic(topics[0].id).unwrap();
    assert_eq!(deletion.changes.len(), 3);
    assert_eq!(harness.topic_aliases(), vec!["A", "B", "C"]);

    let reindexed = harness
        .service
        .topic_history(None)
        .unwrap()
        .into_iter()
        .filter(|h| h.event == HistoryEvent::Reindexed)
        .count();
    assert_eq!(reindexed, 3);
}

#[test]
fn test_reindex_after_delete_is_noop() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(5);
    harness.service.delete_topic(topics[2].id).unwrap();

    let before = harness.service.topic_history(None).unwrap().len();
    assert!(harness.service.reindex_topics().unwrap().is_empty());
    assert!(harness.service.reindex_topics().unwrap().is_empty());
    assert_eq!(harness.service.topic_history(None).unwrap().len(), before);
}

#[test]
fn test_cascade_removes_descendants_only_for_deleted_topic() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(2);
    let doomed = harness.seed_subtree(topics[0].id, 2, 2, 2);
    let kept = harness.seed_subtree(topics[1].id, 1, 1, 3);

    harness.service.delete_topic(topics[0].id).unwrap();

    let repo = harness.service.repository();
    for style in &doomed.styles {
        assert!(repo.get_style_by_id(style.id).unwrap().is_none());
    }
    for place in &doomed.places {
        assert!(repo.get_place_by_id(place.id).unwrap().is_none());
    }
    for item in &doomed.items {
        assert!(repo.get_item_by_id(item.id).unwrap().is_none());
    }

    let tree = harness.service.catalog_tree().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].topic.alias, "A");
    assert_eq!(tree[0].styles[0].style.id, kept.styles[0].id);
    assert_eq!(tree[0].styles[0].places[0].items.len(), 3);

    // Only the topic-level event is recorded for the cascade
    let deleted_rows = harness
        .service
        .topic_history(None)
        .unwrap()
        .into_iter()
        .filter(|h| h.event == HistoryEvent::Deleted)
        .count();
    assert_eq!(deleted_rows, 1);
}

#[test]
fn test_random_deletions_keep_aliases_contiguous() {
    let harness = TestHarness::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut live = harness.seed_topics(40);

    while !live.is_empty() {
        let victim = live.remove(rng.random_range(0..live.len()));
        harness.service.delete_topic(victim.id).unwrap();

        let topics = harness.service.list_topics().unwrap();
        let ids: Vec<u64> = topics.iter().map(|t| t.id).collect();
        let expected_ids: Vec<u64> = live.iter().map(|t| t.id).collect();
        assert_eq!(ids, expected_ids);

        for (rank, topic) in topics.iter().enumerate() {
            assert_eq!(topic.alias, alias::base26(rank as i64 + 1));
            assert_eq!(decode_base26(&topic.alias), rank as i64 + 1);
        }

        if rng.random_bool(0.25) {
            let created = harness
                .service
                .create_topic(CreateTopic::new("Late"))
                .unwrap();
            assert_eq!(created.alias, alias::base26(topics.len() as i64 + 1));
            live.push(created);
        }
    }

    assert!(harness.topic_aliases().is_empty());
}

#[test]
fn test_history_reflects_every_alias_move() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(30);

    harness.service.delete_topic(topics[0].id).unwrap();

    let history = harness.service.topic_history(None).unwrap();
    for row in history.iter().filter(|h| h.event == HistoryEvent::Reindexed) {
        let old_rank = decode_base26(&row.old_alias);
        let new_rank = decode_base26(row.new_alias.as_deref().unwrap());
        assert_eq!(new_rank, old_rank - 1);
        assert_eq!(row.details["reason"], "Re-indexing after deletion");
    }
    assert_eq!(history.len(), 30);
}

#[test]
fn test_swapped_aliases_are_renumbered() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(2);
    let store = CatalogStore::new(harness.storage.clone());

    // Swap aliases out of rank order: t1 = "B", t2 = "A"
    store
        .update_topic_aliases(&[(topics[0].id, "B"), (topics[1].id, "A")])
        .unwrap();
    let doomed = store.insert_topic("Doomed", "C").unwrap();

    let deletion = harness.service.delete_topic(doomed.id).unwrap();
    assert_eq!(deletion.changes.len(), 2);
    assert_eq!(harness.topic_aliases(), vec!["A", "B"]);

    // The freed aliases are claimable again
    let next = harness.service.create_topic(CreateTopic::new("Next")).unwrap();
    assert_eq!(next.alias, "C");
}

#[test]
fn test_failed_reindex_leaves_storage_untouched() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(3);

    // Stale index entry: "B" points at a topic that does not exist
    harness
        .storage
        .put(CF_TOPICS, &AliasKey::new("topic", "B").to_bytes(), b"999")
        .unwrap();

    let err = harness.service.delete_topic(topics[0].id).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.status_code(), 409);

    let repo = harness.service.repository();
    assert!(repo.get_topic_by_id(topics[0].id).unwrap().is_some());
    assert!(harness.service.topic_history(None).unwrap().is_empty());
    assert_eq!(harness.topic_aliases(), vec!["A", "B", "C"]);
}

#[test]
fn test_disabled_reindex_only_records_deletion() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(3);
    let store = CatalogStore::new(harness.storage.clone());
    let engine = ReindexEngine::new("unused", false);

    let deletion = store
        .transaction(|repo| engine.delete_topic(repo, topics[0].id))
        .unwrap();

    assert_eq!(deletion.message, "Topic deleted");
    assert_eq!(harness.topic_aliases(), vec!["B", "C"]);
    assert_eq!(harness.service.topic_history(None).unwrap().len(), 1);
}

#[test]
fn test_create_after_disabled_reindex_skips_used_aliases() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(3);
    let service = CatalogService::with_engine(
        CatalogStore::new(harness.storage.clone()),
        ReindexEngine::new("unused", false),
    );

    service.delete_topic(topics[0].id).unwrap();
    let created = service.create_topic(CreateTopic::new("After gap")).unwrap();

    assert_eq!(created.alias, "D");
    assert_eq!(harness.topic_aliases(), vec!["B", "C", "D"]);

    // Re-enabled renumbering closes the gap
    harness.service.reindex_topics().unwrap();
    assert_eq!(harness.topic_aliases(), vec!["A", "B", "C"]);
}

#[test]
fn test_concurrent_deletes_stay_consistent() {
    let harness = TestHarness::new();
    let topics = harness.seed_topics(12);
    let service = &harness.service;

    std::thread::scope(|scope| {
        for chunk in topics.chunks(3).take(3) {
            let victim = chunk[1].id;
            scope.spawn(move || service.delete_topic(victim).unwrap());
        }
    });

    let expected: Vec<String> = (1..=9).map(alias::base26).collect();
    assert_eq!(harness.topic_aliases(), expected);
}
