//! Query handlers for the Environmental Registry context.
//!
//! Listings are restricted to discovered details.

use everloop_core::discovery::{self, Discoverable};
use everloop_core::error::ProgressionError;
use everloop_core::store::{Filter, LedgerStore, Sort, decode};
use uuid::Uuid;

use crate::domain::records::EnvironmentalDetail;

/// Every detail the player has found, newest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_discovered_details(
    owner: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<EnvironmentalDetail>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new(),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Discovered details at an exact location, newest first.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_details_at_location(
    owner: &str,
    location: &str,
    store: &dyn LedgerStore,
) -> Result<Vec<EnvironmentalDetail>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().eq("location", location),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Discovered details linked to a quest.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_details_for_quest(
    owner: &str,
    quest_id: Uuid,
    store: &dyn LedgerStore,
) -> Result<Vec<EnvironmentalDetail>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().eq("quest_id", quest_id.to_string()),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Discovered details linked to a lore entry.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn list_details_for_lore(
    owner: &str,
    lore_id: Uuid,
    store: &dyn LedgerStore,
) -> Result<Vec<EnvironmentalDetail>, ProgressionError> {
    discovery::list_discovered(
        store,
        owner,
        Filter::new().eq("lore_id", lore_id.to_string()),
        &[Sort::desc("discovered_at")],
        None,
    )
    .await
}

/// Looks up a detail by surrogate id, discovered or not.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if the id does not resolve to a
/// detail owned by the caller.
pub async fn get_detail_by_id(
    owner: &str,
    detail_id: Uuid,
    store: &dyn LedgerStore,
) -> Result<EnvironmentalDetail, ProgressionError> {
    let records = store
        .find_many(
            owner,
            EnvironmentalDetail::COLLECTION,
            &Filter::new().eq("id", detail_id.to_string()),
            &[],
            Some(1),
        )
        .await?;
    let record = records.first().ok_or_else(|| ProgressionError::NotFound {
        entity: "environmental detail",
        key: detail_id.to_string(),
    })?;
    decode(record)
}
