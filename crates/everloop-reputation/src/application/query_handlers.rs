//! Query handlers for the Faction Reputation context.

use everloop_core::error::ProgressionError;
use everloop_core::store::{Filter, LedgerStore, Sort, decode};

use crate::domain::records::FactionReputation;

/// Retrieves the player's standing with one faction.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the player has no record for
/// the faction.
pub async fn get_faction_reputation(
    owner: &str,
    faction: &str,
    store: &dyn LedgerStore,
) -> Result<FactionReputation, ProgressionError> {
    let key = FactionReputation::natural_key(faction);
    let record = store
        .find_one(owner, FactionReputation::COLLECTION, &key)
        .await?
        .ok_or_else(|| ProgressionError::NotFound {
            entity: "reputation",
            key: key.clone(),
        })?;
    decode(&record)
}

/// Lists every faction standing, strongest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_reputations(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<FactionReputation>, ProgressionError> {
    let records = store
        .find_many(
            owner,
            FactionReputation::COLLECTION,
            &Filter::new(),
            &[Sort::desc("level")],
            None,
        )
        .await?;
    records.iter().map(decode).collect()
}

/// Lists factions the player is in good standing with, strongest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_allied_reputations(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<FactionReputation>, ProgressionError> {
    let records = store
        .find_many(
            owner,
            FactionReputation::COLLECTION,
            &Filter::new().gt("level", 0),
            &[Sort::desc("level")],
            None,
        )
        .await?;
    records.iter().map(decode).collect()
}

/// Lists factions the player has antagonized, most hostile first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_hostile_reputations(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<FactionReputation>, ProgressionError> {
    let records = store
        .find_many(
            owner,
            FactionReputation::COLLECTION,
            &Filter::new().lt("level", 0),
            &[Sort::asc("level")],
            None,
        )
        .await?;
    records.iter().map(decode).collect()
}

/// Whether the player's standing with `faction` is at least `threshold`.
/// A player with no record for the faction never meets a threshold.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn has_minimum_reputation(
    owner: &str,
    faction: &str,
    threshold: i32,
    store: &dyn LedgerStore,
) -> Result<bool, ProgressionError> {
    let key = FactionReputation::natural_key(faction);
    match store
        .find_one(owner, FactionReputation::COLLECTION, &key)
        .await?
    {
        Some(record) => {
            let reputation: FactionReputation = decode(&record)?;
            Ok(reputation.level >= threshold)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
    use everloop_test_support::FixedClock;
    use uuid::Uuid;

    use crate::application::command_handlers::handle_adjust_reputation;
    use crate::domain::commands::AdjustReputation;
    use crate::domain::records::AdjustmentPolicy;

    use super::*;

    async fn seed(store: &InMemoryLedgerStore, faction: &str, delta: i32) {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let command = AdjustReputation {
            correlation_id: Uuid::new_v4(),
            owner: "player-1".to_owned(),
            faction: faction.to_owned(),
            delta,
            reason: "seed".to_owned(),
            source: None,
        };
        handle_adjust_reputation(&command, &AdjustmentPolicy::default(), &clock, store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_faction_reputation_returns_not_found_when_absent() {
        let store = InMemoryLedgerStore::new();

        let error = get_faction_reputation("player-1", "Unknown Cult", &store)
            .await
            .unwrap_err();

        assert!(matches!(error, ProgressionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_listings_split_and_order_by_standing() {
        let store = InMemoryLedgerStore::new();
        seed(&store, "Ancient Scholars", 15).await;
        seed(&store, "Iron Pact", -8).await;
        seed(&store, "River Guild", 4).await;
        seed(&store, "Ash Court", -19).await;

        let all = list_reputations("player-1", &store).await.unwrap();
        let factions: Vec<&str> = all.iter().map(|r| r.faction.as_str()).collect();
        assert_eq!(
            factions,
            vec!["Ancient Scholars", "River Guild", "Iron Pact", "Ash Court"]
        );

        let allied = list_allied_reputations("player-1", &store).await.unwrap();
        let factions: Vec<&str> = allied.iter().map(|r| r.faction.as_str()).collect();
        assert_eq!(factions, vec!["Ancient Scholars", "River Guild"]);

        let hostile = list_hostile_reputations("player-1", &store).await.unwrap();
        let factions: Vec<&str> = hostile.iter().map(|r| r.faction.as_str()).collect();
        assert_eq!(factions, vec!["Ash Court", "Iron Pact"]);
    }

    #[tokio::test]
    async fn test_has_minimum_reputation_boundaries() {
        let store = InMemoryLedgerStore::new();
        seed(&store, "Ancient Scholars", 15).await;

        assert!(
            has_minimum_reputation("player-1", "Ancient Scholars", 15, &store)
                .await
                .unwrap()
        );
        assert!(
            !has_minimum_reputation("player-1", "Ancient Scholars", 16, &store)
                .await
                .unwrap()
        );
        // No record at all never meets a threshold, even a negative one.
        assert!(
            !has_minimum_reputation("player-1", "Unknown Cult", -50, &store)
                .await
                .unwrap()
        );
    }
}
