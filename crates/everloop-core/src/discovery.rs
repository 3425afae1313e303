//! Generic discovery pattern.
//!
//! Create-or-reveal semantics shared by every discoverable ledger: a
//! first encounter creates the record already revealed, a previously
//! created but hidden record is revealed in place, and re-revealing an
//! already-revealed record is a `Duplicate` error, never a silent merge.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clock::Clock;
use crate::error::ProgressionError;
use crate::store::{self, Filter, LedgerStore, Sort};

/// A ledger entity with create-or-reveal semantics.
pub trait Discoverable: Clone + Send + Sync + Serialize + DeserializeOwned {
    /// Store collection the entity persists into.
    const COLLECTION: &'static str;

    /// Human-readable entity name used in error values.
    const ENTITY: &'static str;

    /// Composite natural key identifying the entity for its owner.
    fn natural_key(&self) -> String;

    /// Whether the entity has been revealed to the player.
    fn discovered(&self) -> bool;

    /// Marks the entity revealed at the given instant.
    fn mark_discovered(&mut self, at: DateTime<Utc>);
}

/// Discovers `draft` for `owner`.
///
/// # Errors
///
/// Returns `ProgressionError::Duplicate` if the entity at the draft's
/// natural key is already discovered, or `Infrastructure` on store
/// failures.
pub async fn discover<T: Discoverable>(
    store: &dyn LedgerStore,
    clock: &dyn Clock,
    owner: &str,
    draft: T,
) -> Result<T, ProgressionError> {
    let key = draft.natural_key();
    let mut entry = match store.find_one(owner, T::COLLECTION, &key).await? {
        Some(record) => {
            let existing: T = store::decode(&record)?;
            if existing.discovered() {
                return Err(ProgressionError::Duplicate {
                    entity: T::ENTITY,
                    key,
                });
            }
            existing
        }
        None => draft,
    };
    entry.mark_discovered(clock.now());
    let record = store
        .upsert(owner, T::COLLECTION, &key, store::encode(&entry)?)
        .await?;
    store::decode(&record)
}

/// Returns whether the entity at `natural_key` is discovered. A missing
/// record counts as undiscovered.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures.
pub async fn is_discovered<T: Discoverable>(
    store: &dyn LedgerStore,
    owner: &str,
    natural_key: &str,
) -> Result<bool, ProgressionError> {
    match store.find_one(owner, T::COLLECTION, natural_key).await? {
        Some(record) => Ok(store::decode::<T>(&record)?.discovered()),
        None => Ok(false),
    }
}

/// Lists discovered entities matching `filter`, in `sort` order.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` on store failures or
/// undecodable records.
pub async fn list_discovered<T: Discoverable>(
    store: &dyn LedgerStore,
    owner: &str,
    filter: Filter,
    sort: &[Sort],
    limit: Option<usize>,
) -> Result<Vec<T>, ProgressionError> {
    let filter = filter.eq("discovered", true);
    let records = store
        .find_many(owner, T::COLLECTION, &filter, sort, limit)
        .await?;
    records.iter().map(store::decode).collect()
}
