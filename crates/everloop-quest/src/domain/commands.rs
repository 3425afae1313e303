//! Commands for the Quest Ledger context.

use everloop_core::command::Command;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::records::{ObjectiveDraft, QuestCategory, QuestStatus};

/// Command to create a quest.
#[derive(Debug, Clone)]
pub struct CreateQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning player.
    pub owner: String,
    /// Quest id; callers that pre-link the quest elsewhere supply it.
    pub quest_id: Uuid,
    /// Journal title.
    pub title: String,
    /// Journal description.
    pub description: String,
    /// Grouping category.
    pub category: QuestCategory,
    /// Initial lifecycle state; only `NotStarted` or `Active` is valid.
    pub initial_status: QuestStatus,
    /// Quests that must already be completed.
    pub prerequisites: Vec<Uuid>,
    /// Objectives to track.
    pub objectives: Vec<ObjectiveDraft>,
}

impl Command for CreateQuest {
    fn command_type(&self) -> &'static str {
        "quest.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A change to one objective, matched by id. Updates naming an id the
/// quest does not carry are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveUpdate {
    /// Objective to change.
    pub objective_id: u32,
    /// Explicitly set the completed flag.
    #[serde(default)]
    pub completed: Option<bool>,
    /// Advance the progress counter to this value.
    #[serde(default)]
    pub progress: Option<u32>,
}

/// Command to update a quest's status and/or objectives.
#[derive(Debug, Clone)]
pub struct UpdateQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning player.
    pub owner: String,
    /// Quest to update.
    pub quest_id: Uuid,
    /// Requested status; ignored when the objective set forces
    /// completion.
    pub status: Option<QuestStatus>,
    /// Objective changes to apply first.
    pub objectives: Vec<ObjectiveUpdate>,
}

impl Command for UpdateQuest {
    fn command_type(&self) -> &'static str {
        "quest.update"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
