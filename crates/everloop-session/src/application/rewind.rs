//! The checkpoint/rewind engine.
//!
//! Rewind ("return by death") never fails from the player's point of
//! view: a generator failure, or a continuation too broken to use,
//! degrades to restoring the target verbatim with a fixed notice
//! appended. The error is absorbed here and never reaches the caller.

use everloop_core::clock::Clock;
use everloop_core::generator::{NarrativeGenerator, NarrativeRequest, NarrativeResponse};

use crate::domain::state::{Checkpoint, DEFAULT_OUTCOME, GameState, REWIND_NOTICE};

/// Arms a new checkpoint at the current state, replacing any previous
/// one. The snapshot is fully independent of the live state, and the
/// tracked loop choices reset — the loop is now measured from here.
#[must_use]
pub fn set_checkpoint(state: &GameState, clock: &dyn Clock) -> GameState {
    let mut next = state.clone();
    next.checkpoint = Some(Box::new(Checkpoint::capture(state, clock.now())));
    next.loop_choices.clear();
    next
}

fn usable(response: &NarrativeResponse) -> bool {
    !response.scenario.trim().is_empty() && !response.choices.is_empty()
}

/// Restores the armed checkpoint (or the fixed initial state when none
/// is armed), asks the generator for a fresh continuation, and starts
/// the next loop. Always yields a playable state.
pub async fn rewind(state: &GameState, generator: &dyn NarrativeGenerator) -> GameState {
    let target = match &state.checkpoint {
        Some(checkpoint) => checkpoint.restore(state.session_id, &state.owner),
        None => GameState::initial(state.session_id, &state.owner),
    };

    let request = NarrativeRequest {
        prior_scenario: target.narrative.clone(),
        prior_choices: state.loop_choices.clone(),
        outcome: state
            .last_outcome
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTCOME.to_owned()),
    };

    let mut next = target;
    next.loop_count = state.loop_count + 1;
    next.game_over = false;
    next.last_outcome = None;
    // The same checkpoint stays armed; dying again returns here too.
    next.checkpoint = state.checkpoint.clone();

    match generator.continue_story(&request).await {
        Ok(response) if usable(&response) => {
            next.narrative = response.scenario;
            next.choices = response.choices;
        }
        Ok(_) | Err(_) => {
            tracing::warn!(
                session_id = %next.session_id,
                loop_count = next.loop_count,
                "rewind continuation unusable; restoring checkpoint verbatim"
            );
            next.narrative.push_str(REWIND_NOTICE);
        }
    }
    next
}
