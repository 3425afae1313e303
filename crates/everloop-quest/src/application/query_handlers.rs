//! Query handlers for the Quest Ledger context.

use std::collections::HashMap;

use everloop_core::error::ProgressionError;
use everloop_core::store::{Filter, LedgerStore, Sort, decode};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::records::{Quest, QuestCategory, QuestStatus};

/// Completion statistics across the whole quest ledger.
#[derive(Debug, Serialize)]
pub struct QuestStats {
    /// Quests per lifecycle status.
    pub by_status: HashMap<String, u64>,
    /// Quests per category.
    pub by_category: HashMap<String, u64>,
}

/// Retrieves one quest by id.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the quest is missing or not
/// owned by the caller.
pub async fn get_quest(
    owner: &str,
    quest_id: Uuid,
    store: &dyn LedgerStore,
) -> Result<Quest, ProgressionError> {
    let key = Quest::natural_key(quest_id);
    let record = store
        .find_one(owner, Quest::COLLECTION, &key)
        .await?
        .ok_or_else(|| ProgressionError::NotFound {
            entity: "quest",
            key: key.clone(),
        })?;
    decode(&record)
}

/// Lists quests still in play (not yet archived), optionally narrowed
/// to one category, ordered by title.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_active_quests(
    owner: &str,
    category: Option<QuestCategory>,
    store: &dyn LedgerStore,
) -> Result<Vec<Quest>, ProgressionError> {
    let mut filter = Filter::new().any_of(
        "status",
        vec![
            QuestStatus::NotStarted.as_str().to_owned(),
            QuestStatus::Active.as_str().to_owned(),
        ],
    );
    if let Some(category) = category {
        filter = filter.eq("category", category.as_str());
    }
    let records = store
        .find_many(owner, Quest::COLLECTION, &filter, &[Sort::asc("title")], None)
        .await?;
    records.iter().map(decode).collect()
}

/// Lists archived (completed or failed) quests, most recently closed
/// first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_archived_quests(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<Quest>, ProgressionError> {
    let filter = Filter::new().any_of(
        "status",
        vec![
            QuestStatus::Completed.as_str().to_owned(),
            QuestStatus::Failed.as_str().to_owned(),
        ],
    );
    let records = store
        .find_many(
            owner,
            Quest::COLLECTION,
            &filter,
            &[Sort::desc("completed_at")],
            None,
        )
        .await?;
    records.iter().map(decode).collect()
}

/// Counts quests by status and by category.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn get_quest_stats(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<QuestStats, ProgressionError> {
    let by_status = store
        .group_count(owner, Quest::COLLECTION, &Filter::new(), "status")
        .await?;
    let by_category = store
        .group_count(owner, Quest::COLLECTION, &Filter::new(), "category")
        .await?;
    Ok(QuestStats {
        by_status,
        by_category,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
    use everloop_test_support::FixedClock;

    use crate::application::command_handlers::{handle_create_quest, handle_update_quest};
    use crate::domain::commands::{CreateQuest, ObjectiveUpdate, UpdateQuest};
    use crate::domain::records::ObjectiveDraft;

    use super::*;

    async fn seed(
        store: &InMemoryLedgerStore,
        title: &str,
        category: QuestCategory,
    ) -> Uuid {
        let quest_id = Uuid::new_v4();
        handle_create_quest(
            &CreateQuest {
                correlation_id: Uuid::new_v4(),
                owner: "player-1".to_owned(),
                quest_id,
                title: title.to_owned(),
                description: "d".to_owned(),
                category,
                initial_status: QuestStatus::Active,
                prerequisites: Vec::new(),
                objectives: vec![ObjectiveDraft {
                    id: 1,
                    description: "step".to_owned(),
                    target: None,
                }],
            },
            store,
        )
        .await
        .unwrap();
        quest_id
    }

    async fn finish(store: &InMemoryLedgerStore, quest_id: Uuid) {
        handle_update_quest(
            &UpdateQuest {
                correlation_id: Uuid::new_v4(),
                owner: "player-1".to_owned(),
                quest_id,
                status: None,
                objectives: vec![ObjectiveUpdate {
                    objective_id: 1,
                    completed: Some(true),
                    progress: None,
                }],
            },
            &FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()),
            store,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_finished_quests_leave_the_active_list() {
        let store = InMemoryLedgerStore::new();
        let kept = seed(&store, "Restore the Archive", QuestCategory::Main).await;
        let done = seed(&store, "Map the Lowlands", QuestCategory::Exploration).await;
        finish(&store, done).await;

        let active = list_active_quests("player-1", None, &store).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept);

        let archived = list_archived_quests("player-1", &store).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, done);
    }

    #[tokio::test]
    async fn test_active_list_filters_by_category() {
        let store = InMemoryLedgerStore::new();
        seed(&store, "Restore the Archive", QuestCategory::Main).await;
        seed(&store, "Map the Lowlands", QuestCategory::Exploration).await;

        let main = list_active_quests("player-1", Some(QuestCategory::Main), &store)
            .await
            .unwrap();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].title, "Restore the Archive");
    }

    #[tokio::test]
    async fn test_stats_count_by_status_and_category() {
        let store = InMemoryLedgerStore::new();
        seed(&store, "Restore the Archive", QuestCategory::Main).await;
        let done = seed(&store, "Map the Lowlands", QuestCategory::Exploration).await;
        finish(&store, done).await;

        let stats = get_quest_stats("player-1", &store).await.unwrap();
        assert_eq!(stats.by_status.get("active"), Some(&1));
        assert_eq!(stats.by_status.get("completed"), Some(&1));
        assert_eq!(stats.by_category.get("main"), Some(&1));
        assert_eq!(stats.by_category.get("exploration"), Some(&1));
    }

    #[tokio::test]
    async fn test_get_quest_not_found_for_other_owner() {
        let store = InMemoryLedgerStore::new();
        let quest_id = seed(&store, "Restore the Archive", QuestCategory::Main).await;

        assert!(get_quest("player-1", quest_id, &store).await.is_ok());
        let error = get_quest("player-2", quest_id, &store).await.unwrap_err();
        assert!(matches!(error, ProgressionError::NotFound { .. }));
    }
}
