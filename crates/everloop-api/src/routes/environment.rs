//! Routes for the Environmental Registry bounded context.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use everloop_environment::application::query_handlers;
use everloop_environment::domain::commands::DiscoverDetail;
use everloop_environment::domain::records::{
    EnvironmentalDetail, EnvironmentalDraft, InteractionKind,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /discover.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// The discovering player.
    pub owner: String,
    /// The detail being discovered.
    pub detail: EnvironmentalDraft,
}

/// Request body for POST /interact.
#[derive(Debug, Deserialize)]
pub struct InteractRequest {
    /// The interacting player.
    pub owner: String,
    /// The detail to interact with.
    pub detail_id: Uuid,
    /// Override for the stored interaction kind.
    #[serde(default)]
    pub interaction: Option<InteractionKind>,
}

/// Query parameters for the surroundings listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict to an exact location.
    #[serde(default)]
    pub location: Option<String>,
    /// Restrict to details linked to a quest.
    #[serde(default)]
    pub quest_id: Option<Uuid>,
    /// Restrict to details linked to a lore entry.
    #[serde(default)]
    pub lore_id: Option<Uuid>,
}

/// POST /discover
#[instrument(skip(state, request), fields(location = %request.detail.location))]
async fn discover(
    State(state): State<AppState>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<EnvironmentalDetail>, ApiError> {
    let command = DiscoverDetail {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        detail: request.detail,
    };

    info!(correlation_id = %command.correlation_id, "handling environment.discover_detail command");

    let detail = state.facade.record_detail(&command).await?;
    Ok(Json(detail))
}

/// POST /interact
#[instrument(skip(state, request), fields(detail_id = %request.detail_id))]
async fn interact(
    State(state): State<AppState>,
    Json(request): Json<InteractRequest>,
) -> Result<Json<EnvironmentalDetail>, ApiError> {
    let detail = state
        .facade
        .interact_with_environment(&request.owner, request.detail_id, request.interaction)
        .await?;
    Ok(Json(detail))
}

/// GET /{owner}
async fn list(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EnvironmentalDetail>>, ApiError> {
    let store = state.store.as_ref();
    let details = if let Some(location) = params.location.as_deref() {
        query_handlers::list_details_at_location(&owner, location, store).await?
    } else if let Some(quest_id) = params.quest_id {
        query_handlers::list_details_for_quest(&owner, quest_id, store).await?
    } else if let Some(lore_id) = params.lore_id {
        query_handlers::list_details_for_lore(&owner, lore_id, store).await?
    } else {
        query_handlers::list_discovered_details(&owner, store).await?
    };
    Ok(Json(details))
}

/// Returns the router for the environment context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/discover", post(discover))
        .route("/interact", post(interact))
        .route("/{owner}", get(list))
}
