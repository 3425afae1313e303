//! Routes for the Quest Ledger bounded context.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use everloop_quest::application::query_handlers::{self, QuestStats};
use everloop_quest::domain::commands::{CreateQuest, ObjectiveUpdate, UpdateQuest};
use everloop_quest::domain::records::{ObjectiveDraft, Quest, QuestCategory, QuestStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// The owning player.
    pub owner: String,
    /// Quest id; generated when absent.
    #[serde(default)]
    pub quest_id: Option<Uuid>,
    /// Journal title.
    pub title: String,
    /// Journal description.
    pub description: String,
    /// Grouping category.
    pub category: QuestCategory,
    /// Initial lifecycle state.
    pub initial_status: QuestStatus,
    /// Quests that must already be completed.
    #[serde(default)]
    pub prerequisites: Vec<Uuid>,
    /// Objectives to track.
    #[serde(default)]
    pub objectives: Vec<ObjectiveDraft>,
}

/// Request body for POST /update.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// The owning player.
    pub owner: String,
    /// Quest to update.
    pub quest_id: Uuid,
    /// Requested status.
    #[serde(default)]
    pub status: Option<QuestStatus>,
    /// Objective changes.
    #[serde(default)]
    pub objectives: Vec<ObjectiveUpdate>,
}

/// Query parameters for the active listing.
#[derive(Debug, Deserialize)]
pub struct ActiveParams {
    /// Restrict to one category.
    #[serde(default)]
    pub category: Option<QuestCategory>,
}

/// POST /
#[instrument(skip(state, request), fields(title = %request.title))]
async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<Quest>, ApiError> {
    let command = CreateQuest {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        quest_id: request.quest_id.unwrap_or_else(Uuid::new_v4),
        title: request.title,
        description: request.description,
        category: request.category,
        initial_status: request.initial_status,
        prerequisites: request.prerequisites,
        objectives: request.objectives,
    };

    info!(correlation_id = %command.correlation_id, "handling quest.create command");

    let quest = state.facade.create_quest(&command).await?;
    Ok(Json(quest))
}

/// POST /update
#[instrument(skip(state, request), fields(quest_id = %request.quest_id))]
async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Quest>, ApiError> {
    let command = UpdateQuest {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        quest_id: request.quest_id,
        status: request.status,
        objectives: request.objectives,
    };

    info!(correlation_id = %command.correlation_id, "handling quest.update command");

    let quest = state.facade.update_quest(&command).await?;
    Ok(Json(quest))
}

/// GET /{owner}/active
async fn active(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(params): Query<ActiveParams>,
) -> Result<Json<Vec<Quest>>, ApiError> {
    let quests =
        query_handlers::list_active_quests(&owner, params.category, state.store.as_ref()).await?;
    Ok(Json(quests))
}

/// GET /{owner}/archived
async fn archived(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Quest>>, ApiError> {
    let quests = query_handlers::list_archived_quests(&owner, state.store.as_ref()).await?;
    Ok(Json(quests))
}

/// GET /{owner}/stats
async fn stats(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<QuestStats>, ApiError> {
    let stats = query_handlers::get_quest_stats(&owner, state.store.as_ref()).await?;
    Ok(Json(stats))
}

/// Returns the router for the quest context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/update", post(update))
        .route("/{owner}/active", get(active))
        .route("/{owner}/archived", get(archived))
        .route("/{owner}/stats", get(stats))
}
