//! Lore entry records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use everloop_core::discovery::Discoverable;
use everloop_core::store::composite_key;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A piece of narrative lore the player can uncover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
    /// Surrogate id; the natural key is (title, category).
    pub id: Uuid,
    /// Entry title, case-sensitive.
    pub title: String,
    /// Entry category, case-sensitive.
    pub category: String,
    /// The lore text itself.
    pub content: String,
    /// Free-form tags for search.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Where the lore was found, if tied to a place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Characters the entry concerns.
    #[serde(default)]
    pub related_characters: BTreeSet<String>,
    /// Whether the player has uncovered this entry.
    pub discovered: bool,
    /// When the entry was uncovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for a new or to-be-revealed lore entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreDraft {
    /// Entry title.
    pub title: String,
    /// Entry category.
    pub category: String,
    /// The lore text.
    pub content: String,
    /// Tags; absent means none.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Optional location.
    #[serde(default)]
    pub location: Option<String>,
    /// Related characters; absent means none.
    #[serde(default)]
    pub related_characters: BTreeSet<String>,
}

/// Correction to an existing entry. `None` fields are left untouched;
/// the discovery flag is never patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LorePatch {
    /// Replacement lore text.
    #[serde(default)]
    pub content: Option<String>,
    /// Replacement tag set.
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    /// Replacement location.
    #[serde(default)]
    pub location: Option<String>,
    /// Replacement character set.
    #[serde(default)]
    pub related_characters: Option<BTreeSet<String>>,
}

impl LoreEntry {
    /// Natural key for a (title, category) pair.
    #[must_use]
    pub fn natural_key_for(title: &str, category: &str) -> String {
        composite_key(&[title, category])
    }

    /// Builds an undiscovered entry from caller-supplied fields.
    #[must_use]
    pub fn from_draft(draft: LoreDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            category: draft.category,
            content: draft.content,
            tags: draft.tags,
            location: draft.location,
            related_characters: draft.related_characters,
            discovered: false,
            discovered_at: None,
        }
    }

    /// Applies a correction patch.
    pub fn apply_patch(&mut self, patch: LorePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(related_characters) = patch.related_characters {
            self.related_characters = related_characters;
        }
    }
}

impl Discoverable for LoreEntry {
    const COLLECTION: &'static str = "lore_entries";
    const ENTITY: &'static str = "lore entry";

    fn natural_key(&self) -> String {
        Self::natural_key_for(&self.title, &self.category)
    }

    fn discovered(&self) -> bool {
        self.discovered
    }

    fn mark_discovered(&mut self, at: DateTime<Utc>) {
        self.discovered = true;
        self.discovered_at = Some(at);
    }
}
