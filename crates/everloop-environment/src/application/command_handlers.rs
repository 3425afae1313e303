//! Command handlers for the Environmental Registry context.

use everloop_core::clock::Clock;
use everloop_core::discovery;
use everloop_core::error::ProgressionError;
use everloop_core::store::LedgerStore;

use crate::domain::commands::DiscoverDetail;
use crate::domain::records::EnvironmentalDetail;

/// Handles the `DiscoverDetail` command.
///
/// Link requirements are checked before anything touches the store, so
/// an invalid draft never creates a record.
///
/// # Errors
///
/// Returns `ProgressionError::Validation` for missing link references,
/// `Duplicate` if the detail is already discovered, or `Infrastructure`
/// on store failures.
pub async fn handle_discover_detail(
    command: &DiscoverDetail,
    clock: &dyn Clock,
    store: &dyn LedgerStore,
) -> Result<EnvironmentalDetail, ProgressionError> {
    let draft = EnvironmentalDetail::from_draft(command.detail.clone());
    draft.validate_links()?;
    let detail = discovery::discover(store, clock, &command.owner, draft).await?;
    tracing::debug!(
        location = %detail.location,
        description = %detail.description,
        "environmental detail discovered"
    );
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use everloop_core::discovery::Discoverable as _;
    use everloop_core::store::{Filter, LedgerStore as _};
    use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
    use everloop_test_support::FixedClock;
    use uuid::Uuid;

    use crate::domain::records::{EnvironmentalDraft, InteractionKind};

    use super::*;

    fn draft(location: &str, description: &str, interaction: InteractionKind) -> EnvironmentalDraft {
        EnvironmentalDraft {
            location: location.to_owned(),
            description: description.to_owned(),
            interaction,
            quest_id: None,
            lore_id: None,
        }
    }

    fn discover(detail: EnvironmentalDraft) -> DiscoverDetail {
        DiscoverDetail {
            correlation_id: Uuid::new_v4(),
            owner: "player-1".to_owned(),
            detail,
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_first_discovery_creates_revealed_detail() {
        let store = InMemoryLedgerStore::new();
        let clock = fixed_clock();

        let detail = handle_discover_detail(
            &discover(draft("Sunken Archive", "A cracked mural", InteractionKind::Examine)),
            &clock,
            &store,
        )
        .await
        .unwrap();

        assert!(detail.discovered);
        assert_eq!(detail.discovered_at, Some(clock.0));
    }

    #[tokio::test]
    async fn test_rediscovery_at_same_location_and_description_fails() {
        let store = InMemoryLedgerStore::new();
        let clock = fixed_clock();
        let command =
            discover(draft("Sunken Archive", "A cracked mural", InteractionKind::Examine));

        handle_discover_detail(&command, &clock, &store).await.unwrap();
        let error = handle_discover_detail(&command, &clock, &store)
            .await
            .unwrap_err();

        assert!(matches!(error, ProgressionError::Duplicate { .. }));

        // Same description elsewhere is a different detail.
        handle_discover_detail(
            &discover(draft("Iron Hall", "A cracked mural", InteractionKind::Examine)),
            &clock,
            &store,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_lore_kind_requires_lore_link_and_writes_nothing() {
        let store = InMemoryLedgerStore::new();

        let error = handle_discover_detail(
            &discover(draft("Sunken Archive", "A weathered plaque", InteractionKind::Lore)),
            &fixed_clock(),
            &store,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, ProgressionError::Validation(_)));
        let count = store
            .count("player-1", EnvironmentalDetail::COLLECTION, &Filter::new())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_quest_kind_requires_quest_link() {
        let store = InMemoryLedgerStore::new();

        let error = handle_discover_detail(
            &discover(draft("Iron Hall", "A sealed war chest", InteractionKind::Quest)),
            &fixed_clock(),
            &store,
        )
        .await
        .unwrap_err();
        assert!(matches!(error, ProgressionError::Validation(_)));

        let mut linked = draft("Iron Hall", "A sealed war chest", InteractionKind::Quest);
        linked.quest_id = Some(Uuid::new_v4());
        handle_discover_detail(&discover(linked), &fixed_clock(), &store)
            .await
            .unwrap();
    }
}
