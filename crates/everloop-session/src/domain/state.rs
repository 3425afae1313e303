//! The aggregate game state and its pure transitions.
//!
//! The state is an owned value: every transition takes a previous state
//! and produces a new one, so no caller ever observes a half-applied
//! mutation. The checkpoint is a distinct type without a checkpoint
//! slot, which rules out nested snapshots structurally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use everloop_environment::domain::records::EnvironmentalDetail;
use everloop_lore::domain::records::LoreEntry;
use everloop_quest::domain::records::Quest;
use everloop_reputation::domain::records::FactionReputation;

/// Opening scenario for a fresh run.
pub const INITIAL_NARRATIVE: &str = "You wake at the edge of the Sunken Archive, \
salt in your mouth and a bell tolling somewhere below the waterline. The city \
behind you does not remember drowning.";

/// Choices offered at the start of a fresh run.
pub const INITIAL_CHOICES: [&str; 3] = [
    "Descend toward the bell",
    "Search the shoreline for survivors",
    "Follow the lights into the lower city",
];

/// Outcome text used when a rewind happens with nothing recorded.
pub const DEFAULT_OUTCOME: &str = "You met a terrible fate.";

/// Appended to the restored narrative when the generator cannot supply
/// a continuation.
pub const REWIND_NOTICE: &str = "\n\nThe world snaps back to a moment you have \
already lived. Everything is exactly as you remember it.";

/// The full player-visible progression state for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session identity.
    pub session_id: Uuid,
    /// The player this state belongs to.
    pub owner: String,
    /// Current scenario text.
    pub narrative: String,
    /// Choices currently offered.
    pub choices: Vec<String>,
    /// Choices taken since the last checkpoint; sent to the generator
    /// on rewind.
    #[serde(default)]
    pub loop_choices: Vec<String>,
    /// Text of whatever ended the current attempt, if it ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<String>,
    /// Whether the current attempt has ended.
    pub game_over: bool,
    /// How many times the player has lived this stretch of time.
    pub loop_count: u32,
    /// Quests still in play.
    #[serde(default)]
    pub quests: Vec<Quest>,
    /// Quests that reached a terminal status.
    #[serde(default)]
    pub archived_quests: Vec<Quest>,
    /// Faction standings.
    #[serde(default)]
    pub reputations: Vec<FactionReputation>,
    /// Discovered lore.
    #[serde(default)]
    pub lorebook: Vec<LoreEntry>,
    /// Discovered environmental details.
    #[serde(default)]
    pub surroundings: Vec<EnvironmentalDetail>,
    /// The single armed rewind target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Box<Checkpoint>>,
}

/// An independent snapshot of the progression state, usable as a rewind
/// target. Deliberately has no checkpoint field of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Scenario text at the snapshot.
    pub narrative: String,
    /// Choices offered at the snapshot.
    pub choices: Vec<String>,
    /// Outcome recorded at the snapshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<String>,
    /// Loop counter at the snapshot.
    pub loop_count: u32,
    /// Quests still in play at the snapshot.
    pub quests: Vec<Quest>,
    /// Archived quests at the snapshot.
    pub archived_quests: Vec<Quest>,
    /// Faction standings at the snapshot.
    pub reputations: Vec<FactionReputation>,
    /// Discovered lore at the snapshot.
    pub lorebook: Vec<LoreEntry>,
    /// Discovered details at the snapshot.
    pub surroundings: Vec<EnvironmentalDetail>,
}

impl GameState {
    /// The fixed initial state for a session.
    #[must_use]
    pub fn initial(session_id: Uuid, owner: &str) -> Self {
        Self {
            session_id,
            owner: owner.to_owned(),
            narrative: INITIAL_NARRATIVE.to_owned(),
            choices: INITIAL_CHOICES.iter().map(|&c| c.to_owned()).collect(),
            loop_choices: Vec::new(),
            last_outcome: None,
            game_over: false,
            loop_count: 1,
            quests: Vec::new(),
            archived_quests: Vec::new(),
            reputations: Vec::new(),
            lorebook: Vec::new(),
            surroundings: Vec::new(),
            checkpoint: None,
        }
    }

    /// A fresh run for a player, under a new session id.
    #[must_use]
    pub fn new_run(owner: &str) -> Self {
        Self::initial(Uuid::new_v4(), owner)
    }

    /// Marks the current attempt as ended, recording what ended it.
    #[must_use]
    pub fn with_defeat(&self, outcome: &str) -> Self {
        let mut next = self.clone();
        next.game_over = true;
        next.last_outcome = Some(outcome.to_owned());
        next
    }

    /// Patches the aggregate with an authoritative quest record. A
    /// terminal quest moves to the archive; the move is one-way.
    #[must_use]
    pub fn with_quest(&self, quest: Quest) -> Self {
        let mut next = self.clone();
        next.quests.retain(|q| q.id != quest.id);
        if quest.status.is_terminal() {
            next.archived_quests.retain(|q| q.id != quest.id);
            next.archived_quests.push(quest);
        } else {
            next.quests.push(quest);
        }
        next
    }

    /// Patches the aggregate with an authoritative reputation record.
    #[must_use]
    pub fn with_reputation(&self, reputation: FactionReputation) -> Self {
        let mut next = self.clone();
        next.reputations.retain(|r| r.faction != reputation.faction);
        next.reputations.push(reputation);
        next
    }

    /// Patches the aggregate with an authoritative lore record.
    #[must_use]
    pub fn with_lore(&self, entry: LoreEntry) -> Self {
        let mut next = self.clone();
        next.lorebook.retain(|e| e.id != entry.id);
        next.lorebook.push(entry);
        next
    }

    /// Patches the aggregate with an authoritative detail record.
    #[must_use]
    pub fn with_detail(&self, detail: EnvironmentalDetail) -> Self {
        let mut next = self.clone();
        next.surroundings.retain(|d| d.id != detail.id);
        next.surroundings.push(detail);
        next
    }
}

impl Checkpoint {
    /// Captures everything player-visible except the state's own
    /// checkpoint slot.
    #[must_use]
    pub fn capture(state: &GameState, at: DateTime<Utc>) -> Self {
        Self {
            saved_at: at,
            narrative: state.narrative.clone(),
            choices: state.choices.clone(),
            last_outcome: state.last_outcome.clone(),
            loop_count: state.loop_count,
            quests: state.quests.clone(),
            archived_quests: state.archived_quests.clone(),
            reputations: state.reputations.clone(),
            lorebook: state.lorebook.clone(),
            surroundings: state.surroundings.clone(),
        }
    }

    /// Rebuilds a live state from the snapshot. The restored state
    /// carries no checkpoint and no tracked loop choices.
    #[must_use]
    pub fn restore(&self, session_id: Uuid, owner: &str) -> GameState {
        GameState {
            session_id,
            owner: owner.to_owned(),
            narrative: self.narrative.clone(),
            choices: self.choices.clone(),
            loop_choices: Vec::new(),
            last_outcome: self.last_outcome.clone(),
            game_over: false,
            loop_count: self.loop_count,
            quests: self.quests.clone(),
            archived_quests: self.archived_quests.clone(),
            reputations: self.reputations.clone(),
            lorebook: self.lorebook.clone(),
            surroundings: self.surroundings.clone(),
            checkpoint: None,
        }
    }
}
