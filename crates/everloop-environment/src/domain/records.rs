//! Environmental detail records.

use chrono::{DateTime, Utc};
use everloop_core::discovery::Discoverable;
use everloop_core::error::ProgressionError;
use everloop_core::store::composite_key;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What interacting with a detail means for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Pure description; no side effects.
    Examine,
    /// A world interaction handled by the narrative layer.
    Interact,
    /// Reveals a linked lore entry.
    Lore,
    /// Ties into a linked quest.
    Quest,
}

/// A point of interest in the world the player can find and interact
/// with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalDetail {
    /// Surrogate id; the natural key is (location, description).
    pub id: Uuid,
    /// Where the detail sits, case-sensitive.
    pub location: String,
    /// What the detail is, case-sensitive.
    pub description: String,
    /// How the detail reacts to interaction.
    pub interaction: InteractionKind,
    /// Whether the player has found this detail.
    pub discovered: bool,
    /// When the detail was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<DateTime<Utc>>,
    /// Linked quest, required for quest-kind details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_id: Option<Uuid>,
    /// Linked lore entry, required for lore-kind details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore_id: Option<Uuid>,
}

/// Caller-supplied fields for a new or to-be-revealed detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalDraft {
    /// Where the detail sits.
    pub location: String,
    /// What the detail is.
    pub description: String,
    /// How the detail reacts to interaction.
    pub interaction: InteractionKind,
    /// Linked quest id, if any.
    #[serde(default)]
    pub quest_id: Option<Uuid>,
    /// Linked lore id, if any.
    #[serde(default)]
    pub lore_id: Option<Uuid>,
}

impl EnvironmentalDetail {
    /// Natural key for a (location, description) pair.
    #[must_use]
    pub fn natural_key_for(location: &str, description: &str) -> String {
        composite_key(&[location, description])
    }

    /// Builds an undiscovered detail from caller-supplied fields.
    #[must_use]
    pub fn from_draft(draft: EnvironmentalDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            location: draft.location,
            description: draft.description,
            interaction: draft.interaction,
            discovered: false,
            discovered_at: None,
            quest_id: draft.quest_id,
            lore_id: draft.lore_id,
        }
    }

    /// Checks the link requirements of the interaction kind. Storage
    /// does not enforce these references; the registry does.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::Validation` for a lore-kind detail
    /// without a lore link or a quest-kind detail without a quest link.
    pub fn validate_links(&self) -> Result<(), ProgressionError> {
        match self.interaction {
            InteractionKind::Lore if self.lore_id.is_none() => Err(ProgressionError::Validation(
                format!("lore-kind detail '{}' has no linked lore id", self.description),
            )),
            InteractionKind::Quest if self.quest_id.is_none() => {
                Err(ProgressionError::Validation(format!(
                    "quest-kind detail '{}' has no linked quest id",
                    self.description
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Discoverable for EnvironmentalDetail {
    const COLLECTION: &'static str = "environment_details";
    const ENTITY: &'static str = "environmental detail";

    fn natural_key(&self) -> String {
        Self::natural_key_for(&self.location, &self.description)
    }

    fn discovered(&self) -> bool {
        self.discovered
    }

    fn mark_discovered(&mut self, at: DateTime<Utc>) {
        self.discovered = true;
        self.discovered_at = Some(at);
    }
}
