//! Routes for the Faction Reputation bounded context.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use everloop_reputation::application::query_handlers;
use everloop_reputation::domain::commands::AdjustReputation;
use everloop_reputation::domain::records::FactionReputation;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /adjust.
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    /// The player whose standing changes.
    pub owner: String,
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

/// Query parameters for the standing listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// `allied` or `hostile`; absent lists everything.
    #[serde(default)]
    pub standing: Option<String>,
}

/// Response for the threshold check.
#[derive(Debug, Serialize)]
pub struct MeetsResponse {
    /// Whether the standing meets the threshold.
    pub meets: bool,
}

/// POST /adjust
#[instrument(skip(state, request), fields(faction = %request.faction))]
async fn adjust(
    State(state): State<AppState>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<FactionReputation>, ApiError> {
    let command = AdjustReputation {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        faction: request.faction,
        delta: request.delta,
        reason: request.reason,
        source: request.source,
    };

    info!(correlation_id = %command.correlation_id, "handling reputation.adjust command");

    let reputation = state.facade.adjust_reputation(&command).await?;
    Ok(Json(reputation))
}

/// GET /{owner}
async fn list(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<FactionReputation>>, ApiError> {
    let store = state.store.as_ref();
    let reputations = match params.standing.as_deref() {
        Some("allied") => query_handlers::list_allied_reputations(&owner, store).await?,
        Some("hostile") => query_handlers::list_hostile_reputations(&owner, store).await?,
        _ => query_handlers::list_reputations(&owner, store).await?,
    };
    Ok(Json(reputations))
}

/// GET /{owner}/{faction}
async fn get_faction(
    State(state): State<AppState>,
    Path((owner, faction)): Path<(String, String)>,
) -> Result<Json<FactionReputation>, ApiError> {
    let reputation =
        query_handlers::get_faction_reputation(&owner, &faction, state.store.as_ref()).await?;
    Ok(Json(reputation))
}

/// GET /{owner}/{faction}/meets/{threshold}
async fn meets_threshold(
    State(state): State<AppState>,
    Path((owner, faction, threshold)): Path<(String, String, i32)>,
) -> Result<Json<MeetsResponse>, ApiError> {
    let meets =
        query_handlers::has_minimum_reputation(&owner, &faction, threshold, state.store.as_ref())
            .await?;
    Ok(Json(MeetsResponse { meets }))
}

/// Returns the router for the reputation context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/adjust", post(adjust))
        .route("/{owner}", get(list))
        .route("/{owner}/{faction}", get(get_faction))
        .route("/{owner}/{faction}/meets/{threshold}", get(meets_threshold))
}
