//! Command handlers for the Lore Registry context.

use everloop_core::clock::Clock;
use everloop_core::discovery::{self, Discoverable};
use everloop_core::error::ProgressionError;
use everloop_core::store::{LedgerStore, decode, encode};

use crate::domain::commands::{DiscoverLore, UpdateLoreEntry};
use crate::domain::records::LoreEntry;

/// Handles the `DiscoverLore` command.
///
/// A first encounter creates the entry already revealed; a known but
/// hidden entry is revealed in place, keeping its stored fields.
///
/// # Errors
///
/// Returns `ProgressionError::Duplicate` if the entry is already
/// discovered, or `Infrastructure` on store failures.
pub async fn handle_discover_lore(
    command: &DiscoverLore,
    clock: &dyn Clock,
    store: &dyn LedgerStore,
) -> Result<LoreEntry, ProgressionError> {
    let draft = LoreEntry::from_draft(command.entry.clone());
    let entry = discovery::discover(store, clock, &command.owner, draft).await?;
    tracing::debug!(title = %entry.title, category = %entry.category, "lore discovered");
    Ok(entry)
}

/// Handles the `UpdateLoreEntry` command.
///
/// Corrects the stored fields of an owned entry. The discovery flag and
/// timestamp are untouchable through this path.
///
/// # Errors
///
/// Returns `ProgressionError::NotFound` if no entry exists at the
/// (title, category) key for the owner.
pub async fn handle_update_lore_entry(
    command: &UpdateLoreEntry,
    store: &dyn LedgerStore,
) -> Result<LoreEntry, ProgressionError> {
    let key = LoreEntry::natural_key_for(&command.title, &command.category);
    let record = store
        .find_one(&command.owner, LoreEntry::COLLECTION, &key)
        .await?
        .ok_or_else(|| ProgressionError::NotFound {
            entity: "lore entry",
            key: key.clone(),
        })?;

    let mut entry: LoreEntry = decode(&record)?;
    entry.apply_patch(command.patch.clone());

    let record = store
        .upsert(&command.owner, LoreEntry::COLLECTION, &key, encode(&entry)?)
        .await?;
    decode(&record)
}
