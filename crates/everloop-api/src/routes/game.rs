//! Routes for the Run & Rewind bounded context.
//!
//! Each session's aggregate state lives in the session map; handlers
//! hold the write lock for the whole read-compute-store cycle, so a
//! session only ever has one mutator. Ledger mutations issued on behalf
//! of a session patch the aggregate from the authoritative record the
//! ledger returns.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use everloop_core::error::ProgressionError;
use everloop_environment::domain::records::InteractionKind;
use everloop_lore::application::query_handlers as lore_queries;
use everloop_quest::domain::commands::{ObjectiveUpdate, UpdateQuest};
use everloop_quest::domain::records::QuestStatus;
use everloop_reputation::domain::commands::AdjustReputation;
use everloop_session::domain::state::GameState;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /new.
#[derive(Debug, Deserialize)]
pub struct NewGameRequest {
    /// The player starting a run.
    pub owner: String,
}

/// Request body for POST /{session_id}/choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    /// The chosen option text.
    pub choice: String,
}

/// Request body for POST /{session_id}/defeat.
#[derive(Debug, Deserialize)]
pub struct DefeatRequest {
    /// What ended the attempt.
    pub outcome: String,
}

/// Request body for POST /{session_id}/quest.
#[derive(Debug, Deserialize)]
pub struct SessionQuestUpdate {
    /// Quest to update.
    pub quest_id: Uuid,
    /// Requested status.
    #[serde(default)]
    pub status: Option<QuestStatus>,
    /// Objective changes.
    #[serde(default)]
    pub objectives: Vec<ObjectiveUpdate>,
}

/// Request body for POST /{session_id}/reputation.
#[derive(Debug, Deserialize)]
pub struct SessionAdjustment {
    /// The faction, case-sensitive.
    pub faction: String,
    /// Raw delta; capped by policy.
    pub delta: i32,
    /// Why the standing changes.
    pub reason: String,
    /// Optional reference to the cause.
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for POST /{session_id}/lore.
#[derive(Debug, Deserialize)]
pub struct SessionLoreReveal {
    /// The authored entry to reveal.
    pub lore_id: Uuid,
}

/// Request body for POST /{session_id}/interact.
#[derive(Debug, Deserialize)]
pub struct SessionInteraction {
    /// The detail to interact with.
    pub detail_id: Uuid,
    /// Override for the stored interaction kind.
    #[serde(default)]
    pub interaction: Option<InteractionKind>,
}

fn session_not_found(session_id: Uuid) -> ApiError {
    ApiError(ProgressionError::NotFound {
        entity: "session",
        key: session_id.to_string(),
    })
}

/// POST /new
#[instrument(skip(state, request), fields(owner = %request.owner))]
async fn new_game(
    State(state): State<AppState>,
    Json(request): Json<NewGameRequest>,
) -> Json<GameState> {
    let game = state.facade.start_new_game(&request.owner);
    info!(session_id = %game.session_id, "new run started");
    state.sessions.write().await.insert(game.session_id, game.clone());
    Json(game)
}

/// GET /{session_id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameState>, ApiError> {
    let sessions = state.sessions.read().await;
    let game = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(game))
}

/// POST /{session_id}/choice
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn choose(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    let next = state.facade.apply_choice(&current, &request.choice).await?;
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/checkpoint
#[instrument(skip(state), fields(session_id = %session_id))]
async fn checkpoint(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    let next = state.facade.set_checkpoint(&current);
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/rewind
#[instrument(skip(state), fields(session_id = %session_id))]
async fn rewind(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    let next = state.facade.rewind(&current).await;
    info!(loop_count = next.loop_count, "returned by death");
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/defeat
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn defeat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<DefeatRequest>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    let next = state.facade.mark_defeat(&current, &request.outcome);
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/refresh
async fn refresh(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;
    let next = state.facade.refresh(&current).await?;
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/quest
#[instrument(skip(state, request), fields(session_id = %session_id, quest_id = %request.quest_id))]
async fn update_quest(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionQuestUpdate>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;

    let command = UpdateQuest {
        correlation_id: Uuid::new_v4(),
        owner: current.owner.clone(),
        quest_id: request.quest_id,
        status: request.status,
        objectives: request.objectives,
    };
    let quest = state.facade.update_quest(&command).await?;

    let next = current.with_quest(quest);
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/reputation
#[instrument(skip(state, request), fields(session_id = %session_id, faction = %request.faction))]
async fn adjust_reputation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionAdjustment>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;

    let command = AdjustReputation {
        correlation_id: Uuid::new_v4(),
        owner: current.owner.clone(),
        faction: request.faction,
        delta: request.delta,
        reason: request.reason,
        source: request.source,
    };
    let reputation = state.facade.adjust_reputation(&command).await?;

    let next = current.with_reputation(reputation);
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/lore
#[instrument(skip(state, request), fields(session_id = %session_id, lore_id = %request.lore_id))]
async fn reveal_lore(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionLoreReveal>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;

    let entry = state
        .facade
        .discover_lore(&current.owner, request.lore_id)
        .await?;

    let next = current.with_lore(entry);
    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// POST /{session_id}/interact
#[instrument(skip(state, request), fields(session_id = %session_id, detail_id = %request.detail_id))]
async fn interact(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionInteraction>,
) -> Result<Json<GameState>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let current = sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| session_not_found(session_id))?;

    let kind = request.interaction;
    let detail = state
        .facade
        .interact_with_environment(&current.owner, request.detail_id, kind)
        .await?;

    let mut next = current.with_detail(detail.clone());
    // A lore-kind interaction also revealed the linked entry; pull the
    // authoritative record into the aggregate.
    let effective = kind.unwrap_or(detail.interaction);
    if effective == InteractionKind::Lore {
        if let Some(lore_id) = detail.lore_id {
            let entry =
                lore_queries::get_lore_entry_by_id(&next.owner, lore_id, state.store.as_ref())
                    .await?;
            next = next.with_lore(entry);
        }
    }

    sessions.insert(session_id, next.clone());
    Ok(Json(next))
}

/// Returns the router for the game context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(new_game))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/choice", post(choose))
        .route("/{session_id}/checkpoint", post(checkpoint))
        .route("/{session_id}/rewind", post(rewind))
        .route("/{session_id}/defeat", post(defeat))
        .route("/{session_id}/refresh", post(refresh))
        .route("/{session_id}/quest", post(update_quest))
        .route("/{session_id}/reputation", post(adjust_reputation))
        .route("/{session_id}/lore", post(reveal_lore))
        .route("/{session_id}/interact", post(interact))
}
