//! Query handlers for the Lore Registry context.
//!
//! Every listing here is restricted to discovered entries; hidden
//! records stay invisible until revealed through discovery.

use std::collections::{BTreeSet, HashMap};

use everloop_core::discovery::{self, Discoverable};
use everloop_core::error::ProgressionError;
use everloop_core::store::{Filter, LedgerStore, Sort};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::records::LoreEntry;

/// Aggregate lorebook statistics.
#[derive(Debug, Serialize)]
pub struct LorebookStats {
    /// Total discovered entries.
    pub total: u64,
    /// Discovered entries per category.
    pub by_category: HashMap<String, u64>,
}

/// The full lorebook, grouped by category and oldest discovery first
/// within each.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_lorebook(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new(),
        &[Sort::asc("category"), Sort::asc("discovered_at")],
        None,
    )
    .await
}

/// Discovered entries in one category, oldest discovery first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_lore_by_category(
    owner: &str,
    category: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().eq("category", category),
        &[Sort::asc("discovered_at")],
        None,
    )
    .await
}

/// Discovered entries carrying any of the given tags, newest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn search_lore_by_tags(
    owner: &str,
    tags: Vec<String>,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().intersects("tags", tags),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Discovered entries mentioning any of the given characters, newest
/// first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn search_lore_by_characters(
    owner: &str,
    characters: Vec<String>,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().intersects("related_characters", characters),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Discovered entries found at an exact location, newest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_lore_by_location(
    owner: &str,
    location: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().eq("location", location),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// The `limit` most recently discovered entries.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_recent_lore(
    owner: &str,
    limit: usize,
    store: &dyn LedgerStore,
) -> Result<Vec<LoreEntry>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new(),
        &[Sort::desc("discovered_at")],
        Some(limit),
    )
    .await
}

/// Looks up an entry by surrogate id, discovered or not.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the id does not resolve to
/// an entry owned by the caller.
pub async fn get_lore_entry_by_id(
    owner: &str,
    lore_id: Uuid,
    store: &dyn LedgerStore,
) -> Result<LoreEntry, ProgressionError> {
    let records = store
        .find_many(
            owner,
            LoreEntry::COLLECTION,
            &Filter::new().eq("id", lore_id.to_string()),
            &[],
            Some(1),
        )
        .await?;
    let record = records.first().ok_or_else(|| ProgressionError::NotFound {
        entity: "lore entry",
        key: lore_id.to_string(),
    })?;
    everloop_core::store::decode(record)
}

/// Totals for the discovered lorebook.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_lorebook_stats(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<LorebookStats, ProgressionError> {
    let discovered = Filter::new().eq("discovered", true);
    let total = store
        .count(owner, LoreEntry::COLLECTION, &discovered)
        .await?;
    let by_category = store
        .group_count(owner, LoreEntry::COLLECTION, &discovered, "category")
        .await?;
    Ok(LorebookStats { total, by_category })
}

/// Distinct categories with at least one discovered entry, sorted.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_lore_categories(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<String>, ProgressionError> {
    let discovered = Filter::new().eq("discovered", true);
    let groups = store
        .group_count(owner, LoreEntry::COLLECTION, &discovered, "category")
        .await?;
    let mut categories: Vec<String> = groups.into_keys().collect();
    categories.sort();
    Ok(categories)
}

/// The sorted union of tags across all discovered entries.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_lore_tags(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<String>, ProgressionError> {
    let entries =
        discovery::list_discovered::<LoreEntry>(store, owner, Filter::new(), &[], None).await?;
    let tags: BTreeSet<String> = entries.into_iter().flat_map(|e| e.tags).collect();
    Ok(tags.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, TimeZone, Utc};
    use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
    use everloop_test_support::FixedClock;
    use uuid::Uuid;

    use crate::application::command_handlers::handle_discover_lore;
    use crate::domain::commands::DiscoverLore;
    use crate::domain::records::LoreDraft;

    use super::*;

    struct Seed<'a> {
        title: &'a str,
        category: &'a str,
        tags: &'a [&'a str],
        characters: &'a [&'a str],
        location: Option<&'a str>,
        at: DateTime<Utc>,
    }

    async fn discover(store: &InMemoryLedgerStore, seed: Seed<'_>) {
        let command = DiscoverLore {
            correlation_id: Uuid::new_v4(),
            owner: "player-1".to_owned(),
            entry: LoreDraft {
                title: seed.title.to_owned(),
                category: seed.category.to_owned(),
                content: "content".to_owned(),
                tags: seed.tags.iter().map(|&t| t.to_owned()).collect(),
                location: seed.location.map(ToOwned::to_owned),
                related_characters: seed.characters.iter().map(|&c| c.to_owned()).collect(),
            },
        };
        handle_discover_lore(&command, &FixedClock(seed.at), store)
            .await
            .unwrap();
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    async fn seeded_store() -> InMemoryLedgerStore {
        let store = InMemoryLedgerStore::new();
        discover(
            &store,
            Seed {
                title: "The Lost Civilization",
                category: "History",
                tags: &["ruins", "empire"],
                characters: &["Maren"],
                location: Some("Sunken Archive"),
                at: at(3, 10),
            },
        )
        .await;
        discover(
            &store,
            Seed {
                title: "Songs of the Deep",
                category: "Myth",
                tags: &["gods"],
                characters: &["Maren", "Oril"],
                location: None,
                at: at(1, 10),
            },
        )
        .await;
        discover(
            &store,
            Seed {
                title: "Founding of the Pact",
                category: "History",
                tags: &["empire"],
                characters: &[],
                location: Some("Iron Hall"),
                at: at(2, 10),
            },
        )
        .await;
        store
    }

    #[tokio::test]
    async fn test_lorebook_orders_by_category_then_discovery_time() {
        let store = seeded_store().await;

        let lorebook = get_lorebook("player-1", &store).await.unwrap();
        let titles: Vec<&str> = lorebook.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                "Founding of the Pact",
                "The Lost Civilization",
                "Songs of the Deep"
            ]
        );
    }

    #[tokio::test]
    async fn test_hidden_entries_stay_out_of_every_listing() {
        let store = seeded_store().await;

        // A hidden entry seeded directly, as authored-but-unfound content.
        use everloop_core::store::{LedgerStore as _, encode};
        let hidden = LoreEntry::from_draft(LoreDraft {
            title: "Unfound Secret".to_owned(),
            category: "History".to_owned(),
            content: "content".to_owned(),
            tags: BTreeSet::from(["empire".to_owned()]),
            location: None,
            related_characters: BTreeSet::new(),
        });
        store
            .upsert(
                "player-1",
                LoreEntry::COLLECTION,
                &Discoverable::natural_key(&hidden),
                encode(&hidden).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(get_lorebook("player-1", &store).await.unwrap().len(), 3);
        assert_eq!(
            search_lore_by_tags("player-1", vec!["empire".to_owned()], &store)
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(get_lorebook_stats("player-1", &store).await.unwrap().total, 3);
    }

    #[tokio::test]
    async fn test_tag_search_matches_any_tag_newest_first() {
        let store = seeded_store().await;

        let hits = search_lore_by_tags(
            "player-1",
            vec!["empire".to_owned(), "gods".to_owned()],
            &store,
        )
        .await
        .unwrap();
        let titles: Vec<&str> = hits.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                "The Lost Civilization",
                "Founding of the Pact",
                "Songs of the Deep"
            ]
        );
    }

    #[tokio::test]
    async fn test_character_and_location_search() {
        let store = seeded_store().await;

        let by_character = search_lore_by_characters("player-1", vec!["Oril".to_owned()], &store)
            .await
            .unwrap();
        assert_eq!(by_character.len(), 1);
        assert_eq!(by_character[0].title, "Songs of the Deep");

        let by_location = get_lore_by_location("player-1", "Iron Hall", &store)
            .await
            .unwrap();
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].title, "Founding of the Pact");
    }

    #[tokio::test]
    async fn test_recent_lore_limits_newest_first() {
        let store = seeded_store().await;

        let recent = get_recent_lore("player-1", 2, &store).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(titles, vec!["The Lost Civilization", "Founding of the Pact"]);
    }

    #[tokio::test]
    async fn test_stats_categories_and_tag_union() {
        let store = seeded_store().await;

        let stats = get_lorebook_stats("player-1", &store).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category.get("History"), Some(&2));
        assert_eq!(stats.by_category.get("Myth"), Some(&1));

        let categories = list_lore_categories("player-1", &store).await.unwrap();
        assert_eq!(categories, vec!["History", "Myth"]);

        let tags = list_lore_tags("player-1", &store).await.unwrap();
        assert_eq!(tags, vec!["empire", "gods", "ruins"]);
    }

    #[tokio::test]
    async fn test_by_category_orders_oldest_discovery_first() {
        let store = seeded_store().await;

        let history = get_lore_by_category("player-1", "History", &store)
            .await
            .unwrap();
        let titles: Vec<&str> = history.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(titles, vec!["Founding of the Pact", "The Lost Civilization"]);
    }
}
