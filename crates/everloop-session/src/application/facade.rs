//! The progression façade.
//!
//! Single entry point for the presentation layer. Ledger mutations fan
//! out to the bounded contexts and return the authoritative updated
//! record; the aggregate is patched from those return values, never
//! re-derived ad hoc. No cross-ledger transaction exists — a game event
//! that touches two ledgers is two independently durable writes, and
//! callers must tolerate one landing without the other.

use std::sync::Arc;

use uuid::Uuid;

use everloop_core::clock::Clock;
use everloop_core::error::ProgressionError;
use everloop_core::generator::{NarrativeGenerator, NarrativeRequest};
use everloop_core::store::LedgerStore;
use everloop_environment::application::{
    command_handlers as environment_commands, query_handlers as environment_queries,
};
use everloop_environment::domain::commands::DiscoverDetail;
use everloop_environment::domain::records::{EnvironmentalDetail, EnvironmentalDraft, InteractionKind};
use everloop_lore::application::{command_handlers as lore_commands, query_handlers as lore_queries};
use everloop_lore::domain::commands::{DiscoverLore, UpdateLoreEntry};
use everloop_lore::domain::records::{LoreDraft, LoreEntry};
use everloop_quest::application::{
    command_handlers as quest_commands, query_handlers as quest_queries,
};
use everloop_quest::domain::commands::{CreateQuest, UpdateQuest};
use everloop_quest::domain::records::Quest;
use everloop_reputation::application::{
    command_handlers as reputation_commands, query_handlers as reputation_queries,
};
use everloop_reputation::domain::commands::AdjustReputation;
use everloop_reputation::domain::records::{AdjustmentPolicy, FactionReputation};

use crate::application::rewind;
use crate::domain::state::GameState;

/// Façade over the progression ledgers and the rewind engine.
pub struct ProgressionFacade {
    store: Arc<dyn LedgerStore>,
    generator: Arc<dyn NarrativeGenerator>,
    clock: Arc<dyn Clock>,
    policy: AdjustmentPolicy,
}

impl ProgressionFacade {
    /// Creates a façade with the default adjustment policy.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        generator: Arc<dyn NarrativeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_policy(store, generator, clock, AdjustmentPolicy::default())
    }

    /// Creates a façade with an explicit adjustment policy.
    #[must_use]
    pub fn with_policy(
        store: Arc<dyn LedgerStore>,
        generator: Arc<dyn NarrativeGenerator>,
        clock: Arc<dyn Clock>,
        policy: AdjustmentPolicy,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            policy,
        }
    }

    /// Starts a fresh run for a player.
    #[must_use]
    pub fn start_new_game(&self, owner: &str) -> GameState {
        GameState::new_run(owner)
    }

    /// Advances the narrative along a chosen option.
    ///
    /// A structurally unusable continuation is a soft failure: the
    /// pre-call state comes back unchanged. A transport failure is
    /// surfaced, and the caller keeps the previous state — nothing here
    /// mutates in place.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::ExternalService` if the generator
    /// call fails.
    pub async fn apply_choice(
        &self,
        state: &GameState,
        choice: &str,
    ) -> Result<GameState, ProgressionError> {
        let request = NarrativeRequest {
            prior_scenario: state.narrative.clone(),
            prior_choices: state.choices.clone(),
            outcome: choice.to_owned(),
        };
        let response = self.generator.continue_story(&request).await?;
        if response.scenario.trim().is_empty() || response.choices.is_empty() {
            tracing::warn!(session_id = %state.session_id, "unusable continuation; keeping prior state");
            return Ok(state.clone());
        }

        let mut next = state.clone();
        next.narrative = response.scenario;
        next.choices = response.choices;
        next.loop_choices.push(choice.to_owned());
        Ok(next)
    }

    /// Arms a checkpoint at the current state.
    #[must_use]
    pub fn set_checkpoint(&self, state: &GameState) -> GameState {
        rewind::set_checkpoint(state, self.clock.as_ref())
    }

    /// Returns by death: restores the armed checkpoint (or the initial
    /// state) and starts the next loop. Never fails.
    pub async fn rewind(&self, state: &GameState) -> GameState {
        rewind::rewind(state, self.generator.as_ref()).await
    }

    /// Records the end of the current attempt.
    #[must_use]
    pub fn mark_defeat(&self, state: &GameState, outcome: &str) -> GameState {
        state.with_defeat(outcome)
    }

    /// Creates a quest after validating its prerequisites.
    ///
    /// # Errors
    ///
    /// Propagates the quest ledger's validation failures.
    pub async fn create_quest(&self, command: &CreateQuest) -> Result<Quest, ProgressionError> {
        quest_commands::handle_create_quest(command, self.store.as_ref()).await
    }

    /// Updates a quest's objectives and status.
    ///
    /// # Errors
    ///
    /// Propagates the quest ledger's not-found and validation failures.
    pub async fn update_quest(&self, command: &UpdateQuest) -> Result<Quest, ProgressionError> {
        quest_commands::handle_update_quest(command, self.clock.as_ref(), self.store.as_ref()).await
    }

    /// Adjusts a faction standing under the configured policy.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn adjust_reputation(
        &self,
        command: &AdjustReputation,
    ) -> Result<FactionReputation, ProgressionError> {
        reputation_commands::handle_adjust_reputation(
            command,
            &self.policy,
            self.clock.as_ref(),
            self.store.as_ref(),
        )
        .await
    }

    /// Records a lore discovery from full entry data, as the narrative
    /// layer produces it.
    ///
    /// # Errors
    ///
    /// Propagates the lore registry's duplicate failure.
    pub async fn record_lore(&self, command: &DiscoverLore) -> Result<LoreEntry, ProgressionError> {
        lore_commands::handle_discover_lore(command, self.clock.as_ref(), self.store.as_ref()).await
    }

    /// Reveals an already-authored lore entry by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Duplicate` if the
    /// entry is already revealed.
    pub async fn discover_lore(
        &self,
        owner: &str,
        lore_id: Uuid,
    ) -> Result<LoreEntry, ProgressionError> {
        let entry = lore_queries::get_lore_entry_by_id(owner, lore_id, self.store.as_ref()).await?;
        let command = DiscoverLore {
            correlation_id: Uuid::new_v4(),
            owner: owner.to_owned(),
            entry: LoreDraft {
                title: entry.title,
                category: entry.category,
                content: entry.content,
                tags: entry.tags,
                location: entry.location,
                related_characters: entry.related_characters,
            },
        };
        self.record_lore(&command).await
    }

    /// Corrects an owned lore entry's fields.
    ///
    /// # Errors
    ///
    /// Propagates the lore registry's not-found failure.
    pub async fn update_lore(
        &self,
        command: &UpdateLoreEntry,
    ) -> Result<LoreEntry, ProgressionError> {
        lore_commands::handle_update_lore_entry(command, self.store.as_ref()).await
    }

    /// Records an environmental detail discovery from full data.
    ///
    /// # Errors
    ///
    /// Propagates the registry's validation and duplicate failures.
    pub async fn record_detail(
        &self,
        command: &DiscoverDetail,
    ) -> Result<EnvironmentalDetail, ProgressionError> {
        environment_commands::handle_discover_detail(command, self.clock.as_ref(), self.store.as_ref())
            .await
    }

    /// Interacts with a known detail by id: the detail is revealed, and
    /// a lore-kind interaction also reveals its linked entry. Lore the
    /// player already knows does not fail the interaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `Duplicate` if the detail
    /// itself was already interacted with, and propagates link
    /// validation failures.
    pub async fn interact_with_environment(
        &self,
        owner: &str,
        detail_id: Uuid,
        interaction: Option<InteractionKind>,
    ) -> Result<EnvironmentalDetail, ProgressionError> {
        let known =
            environment_queries::get_detail_by_id(owner, detail_id, self.store.as_ref()).await?;
        let kind = interaction.unwrap_or(known.interaction);

        let command = DiscoverDetail {
            correlation_id: Uuid::new_v4(),
            owner: owner.to_owned(),
            detail: EnvironmentalDraft {
                location: known.location,
                description: known.description,
                interaction: known.interaction,
                quest_id: known.quest_id,
                lore_id: known.lore_id,
            },
        };
        let detail = self.record_detail(&command).await?;

        if kind == InteractionKind::Lore {
            if let Some(lore_id) = detail.lore_id {
                match self.discover_lore(owner, lore_id).await {
                    Ok(_) | Err(ProgressionError::Duplicate { .. }) => {}
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(detail)
    }

    /// Rebuilds the aggregate's ledger collections from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn refresh(&self, state: &GameState) -> Result<GameState, ProgressionError> {
        let store = self.store.as_ref();
        let mut next = state.clone();
        next.quests = quest_queries::list_active_quests(&state.owner, None, store).await?;
        next.archived_quests = quest_queries::list_archived_quests(&state.owner, store).await?;
        next.reputations = reputation_queries::list_reputations(&state.owner, store).await?;
        next.lorebook = lore_queries::get_lorebook(&state.owner, store).await?;
        next.surroundings = environment_queries::list_discovered_details(&state.owner, store).await?;
        Ok(next)
    }
}
