//! Integration tests for `PgLedgerStore`.
//!
//! These need a reachable PostgreSQL instance and are ignored by
//! default. Run them with:
//!
//! ```text
//! EVERLOOP_TEST_DATABASE_URL=postgres://localhost/everloop_test \
//!     cargo test -p everloop-ledger-store -- --ignored
//! ```

use serde_json::json;
use sqlx::postgres::PgPoolOptions;

use everloop_core::store::{Filter, LedgerStore, Sort};
use everloop_ledger_store::pg_ledger_store::PgLedgerStore;

async fn connect() -> PgLedgerStore {
    let url = std::env::var("EVERLOOP_TEST_DATABASE_URL")
        .expect("EVERLOOP_TEST_DATABASE_URL must be set for ignored pg tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    let store = PgLedgerStore::new(pool);
    store.ensure_schema().await.expect("schema creation failed");
    store
}

fn unique_owner(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires PostgreSQL; set EVERLOOP_TEST_DATABASE_URL"]
async fn test_upsert_and_find_one_round_trip() {
    let store = connect().await;
    let owner = unique_owner("pg");

    let inserted = store
        .upsert(&owner, "quests", "q-1", json!({"title": "First Steps"}))
        .await
        .unwrap();

    let found = store.find_one(&owner, "quests", "q-1").await.unwrap();
    let found = found.expect("record should exist");
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.fields["title"], "First Steps");
}

#[tokio::test]
#[ignore = "requires PostgreSQL; set EVERLOOP_TEST_DATABASE_URL"]
async fn test_upsert_conflict_replaces_fields_once() {
    let store = connect().await;
    let owner = unique_owner("pg");

    let first = store
        .upsert(&owner, "quests", "q-1", json!({"title": "Old"}))
        .await
        .unwrap();
    let second = store
        .upsert(&owner, "quests", "q-1", json!({"title": "New"}))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.fields["title"], "New");
    assert_eq!(store.count(&owner, "quests", &Filter::new()).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL; set EVERLOOP_TEST_DATABASE_URL"]
async fn test_filters_sorts_and_group_count() {
    let store = connect().await;
    let owner = unique_owner("pg");

    for (key, level, category, tags) in [
        ("a", 30, "History", json!(["ruins", "empire"])),
        ("b", -10, "History", json!(["gods"])),
        ("c", 50, "Myth", json!([])),
    ] {
        store
            .upsert(
                &owner,
                "lore",
                key,
                json!({"level": level, "category": category, "tags": tags}),
            )
            .await
            .unwrap();
    }

    let positive = store
        .find_many(
            &owner,
            "lore",
            &Filter::new().gt("level", 0),
            &[Sort::desc("level")],
            None,
        )
        .await
        .unwrap();
    let keys: Vec<&str> = positive.iter().map(|r| r.natural_key.as_str()).collect();
    assert_eq!(keys, vec!["c", "a"]);

    let tagged = store
        .find_many(
            &owner,
            "lore",
            &Filter::new().intersects("tags", vec!["gods".to_owned()]),
            &[],
            None,
        )
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].natural_key, "b");

    let groups = store
        .group_count(&owner, "lore", &Filter::new(), "category")
        .await
        .unwrap();
    assert_eq!(groups.get("History"), Some(&2));
    assert_eq!(groups.get("Myth"), Some(&1));
}
