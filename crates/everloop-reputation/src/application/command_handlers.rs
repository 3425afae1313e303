//! Command handlers for the Faction Reputation context.
//!
//! Handlers load the current record through the ledger store, apply the
//! bounded adjustment, and persist the result; the returned record is
//! authoritative and is what callers patch their aggregate from.

use everloop_core::clock::Clock;
use everloop_core::error::ProgressionError;
use everloop_core::store::{LedgerStore, decode, encode};

use crate::domain::commands::AdjustReputation;
use crate::domain::records::{
    AdjustmentPolicy, FactionReputation, ReputationChange, title_for,
};

/// Handles the `AdjustReputation` command.
///
/// The raw delta is capped per call, the accumulated level is clamped to
/// the policy bounds, and the applied change is appended to the record's
/// history before the upsert.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` if the store fails.
pub async fn handle_adjust_reputation(
    command: &AdjustReputation,
    policy: &AdjustmentPolicy,
    clock: &dyn Clock,
    store: &dyn LedgerStore,
) -> Result<FactionReputation, ProgressionError> {
    let key = FactionReputation::natural_key(&command.faction);
    let mut reputation = match store
        .find_one(&command.owner, FactionReputation::COLLECTION, &key)
        .await?
    {
        Some(record) => decode(&record)?,
        None => FactionReputation::neutral(&command.faction),
    };

    let applied = policy.clamp_delta(command.delta);
    reputation.level = policy.clamp_level(reputation.level + applied);
    reputation.title = title_for(&reputation.faction, reputation.level);
    reputation.history.push(ReputationChange {
        amount: applied,
        reason: command.reason.clone(),
        source: command.source.clone(),
        timestamp: clock.now(),
    });

    tracing::debug!(
        faction = %command.faction,
        applied,
        level = reputation.level,
        "reputation adjusted"
    );

    let record = store
        .upsert(
            &command.owner,
            FactionReputation::COLLECTION,
            &key,
            encode(&reputation)?,
        )
        .await?;
    decode(&record)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
    use everloop_test_support::{FailingLedgerStore, FixedClock};
    use uuid::Uuid;

    use super::*;

    fn adjust(faction: &str, delta: i32) -> AdjustReputation {
        AdjustReputation {
            correlation_id: Uuid::new_v4(),
            owner: "player-1".to_owned(),
            faction: faction.to_owned(),
            delta,
            reason: "helped the archivists".to_owned(),
            source: None,
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_two_small_adjustments_accumulate_with_full_history() {
        let store = InMemoryLedgerStore::new();
        let clock = fixed_clock();
        let policy = AdjustmentPolicy::default();

        let command = adjust("Ancient Scholars", 5);
        handle_adjust_reputation(&command, &policy, &clock, &store)
            .await
            .unwrap();
        let reputation = handle_adjust_reputation(&command, &policy, &clock, &store)
            .await
            .unwrap();

        assert_eq!(reputation.level, 10);
        assert_eq!(reputation.title, "Ancient Scholars Neutral");
        assert_eq!(reputation.history.len(), 2);
        assert!(reputation.history.iter().all(|c| c.amount == 5));
        assert!(reputation.history.iter().all(|c| c.timestamp == clock.0));
    }

    #[tokio::test]
    async fn test_oversized_delta_is_capped_per_call() {
        let store = InMemoryLedgerStore::new();
        let policy = AdjustmentPolicy::default();

        let reputation = handle_adjust_reputation(
            &adjust("Ancient Scholars", 50),
            &policy,
            &fixed_clock(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(reputation.level, 20);
        assert_eq!(reputation.title, "Ancient Scholars Friend");
        assert_eq!(reputation.history.len(), 1);
        assert_eq!(reputation.history[0].amount, 20);
    }

    #[tokio::test]
    async fn test_accumulated_level_clamps_at_ceiling_and_floor() {
        let store = InMemoryLedgerStore::new();
        let clock = fixed_clock();
        let policy = AdjustmentPolicy::default();

        for _ in 0..6 {
            handle_adjust_reputation(&adjust("Iron Pact", 20), &policy, &clock, &store)
                .await
                .unwrap();
        }
        let at_ceiling = handle_adjust_reputation(&adjust("Iron Pact", 20), &policy, &clock, &store)
            .await
            .unwrap();
        assert_eq!(at_ceiling.level, 100);
        assert_eq!(at_ceiling.title, "Iron Pact Champion");
        // The capped delta is still recorded even when the level saturates.
        assert_eq!(at_ceiling.history.len(), 7);

        for _ in 0..11 {
            handle_adjust_reputation(&adjust("Iron Pact", -999), &policy, &clock, &store)
                .await
                .unwrap();
        }
        let at_floor = handle_adjust_reputation(&adjust("Iron Pact", -999), &policy, &clock, &store)
            .await
            .unwrap();
        assert_eq!(at_floor.level, -100);
        assert_eq!(at_floor.title, "Iron Pact Pariah");
        assert_eq!(at_floor.history.last().unwrap().amount, -20);
    }

    #[tokio::test]
    async fn test_configured_cap_overrides_default() {
        let store = InMemoryLedgerStore::new();
        let policy = AdjustmentPolicy {
            per_call_cap: 5,
            ..AdjustmentPolicy::default()
        };

        let reputation = handle_adjust_reputation(
            &adjust("Ancient Scholars", 50),
            &policy,
            &fixed_clock(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(reputation.level, 5);
        assert_eq!(reputation.history[0].amount, 5);
    }

    #[tokio::test]
    async fn test_source_reference_is_preserved_in_history() {
        let store = InMemoryLedgerStore::new();
        let mut command = adjust("Ancient Scholars", 3);
        command.source = Some("quest:archive-restoration".to_owned());

        let reputation = handle_adjust_reputation(
            &command,
            &AdjustmentPolicy::default(),
            &fixed_clock(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(
            reputation.history[0].source.as_deref(),
            Some("quest:archive-restoration")
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates_as_infrastructure_error() {
        let error = handle_adjust_reputation(
            &adjust("Ancient Scholars", 5),
            &AdjustmentPolicy::default(),
            &fixed_clock(),
            &FailingLedgerStore,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, ProgressionError::Infrastructure(_)));
    }
}
