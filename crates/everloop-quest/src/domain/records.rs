//! Quest records and lifecycle rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broad grouping used for journal filtering and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestCategory {
    /// Critical-path quests.
    Main,
    /// Optional content.
    Side,
    /// Faction storylines.
    Faction,
    /// Relationship storylines.
    Romance,
    /// World exploration.
    Exploration,
    /// Quests the narrative layer spawns on its own.
    Auto,
}

impl QuestCategory {
    /// Stable string form; must match the serde renames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Side => "side",
            Self::Faction => "faction",
            Self::Romance => "romance",
            Self::Exploration => "exploration",
            Self::Auto => "auto",
        }
    }
}

/// Lifecycle state. `NotStarted → Active → {Completed | Failed}`; the
/// terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// Known but not yet taken up.
    NotStarted,
    /// In progress.
    Active,
    /// Finished successfully. Terminal.
    Completed,
    /// Finished unsuccessfully. Terminal.
    Failed,
}

impl QuestStatus {
    /// Whether the status is final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stable string form; must match the serde renames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A single step toward finishing a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    /// Objective id, unique within its quest.
    pub id: u32,
    /// What the player has to do.
    pub description: String,
    /// Whether the step is done.
    pub completed: bool,
    /// Progress counter; present exactly when `target` is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Count at which the objective completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

/// Caller-supplied fields for a new objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveDraft {
    /// Objective id, unique within its quest.
    pub id: u32,
    /// What the player has to do.
    pub description: String,
    /// Optional completion count; its presence gives the objective a
    /// progress counter starting at zero.
    #[serde(default)]
    pub target: Option<u32>,
}

impl Objective {
    /// Builds a fresh objective from caller-supplied fields.
    #[must_use]
    pub fn from_draft(draft: ObjectiveDraft) -> Self {
        Self {
            id: draft.id,
            description: draft.description,
            completed: false,
            progress: draft.target.map(|_| 0),
            target: draft.target,
        }
    }
}

/// A tracked quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Quest id; doubles as the natural key.
    pub id: Uuid,
    /// Journal title.
    pub title: String,
    /// Journal description.
    pub description: String,
    /// Grouping category.
    pub category: QuestCategory,
    /// Lifecycle state.
    pub status: QuestStatus,
    /// Quests that had to be completed before this one could exist.
    #[serde(default)]
    pub prerequisites: Vec<Uuid>,
    /// Ordered objectives.
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Stamped once, on the transition into a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Store collection for quest records.
    pub const COLLECTION: &'static str = "quests";

    /// Natural key for a quest id.
    #[must_use]
    pub fn natural_key(id: Uuid) -> String {
        id.to_string()
    }

    /// Whether the objective set forces completion. A quest with no
    /// objectives never auto-completes.
    #[must_use]
    pub fn all_objectives_completed(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(|o| o.completed)
    }
}
