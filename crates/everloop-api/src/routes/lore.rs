//! Routes for the Lore Registry bounded context.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use everloop_lore::application::query_handlers::{self, LorebookStats};
use everloop_lore::domain::commands::{DiscoverLore, UpdateLoreEntry};
use everloop_lore::domain::records::{LoreDraft, LoreEntry, LorePatch};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /discover.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// The discovering player.
    pub owner: String,
    /// The entry being discovered.
    pub entry: LoreDraft,
}

/// Request body for POST /update.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// The owning player.
    pub owner: String,
    /// Title of the entry to patch.
    pub title: String,
    /// Category of the entry to patch.
    pub category: String,
    /// The correction to apply.
    pub patch: LorePatch,
}

/// Query parameters for the lorebook listing.
#[derive(Debug, Deserialize)]
pub struct LorebookParams {
    /// Restrict to one category.
    #[serde(default)]
    pub category: Option<String>,
    /// Comma-separated tags; entries carrying any of them match.
    #[serde(default)]
    pub tags: Option<String>,
    /// Comma-separated character names.
    #[serde(default)]
    pub characters: Option<String>,
    /// Exact location.
    #[serde(default)]
    pub location: Option<String>,
    /// Only the N most recent discoveries.
    #[serde(default)]
    pub recent: Option<usize>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// POST /discover
#[instrument(skip(state, request), fields(title = %request.entry.title))]
async fn discover(
    State(state): State<AppState>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<LoreEntry>, ApiError> {
    let command = DiscoverLore {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        entry: request.entry,
    };

    info!(correlation_id = %command.correlation_id, "handling lore.discover command");

    let entry = state.facade.record_lore(&command).await?;
    Ok(Json(entry))
}

/// POST /update
#[instrument(skip(state, request), fields(title = %request.title))]
async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<LoreEntry>, ApiError> {
    let command = UpdateLoreEntry {
        correlation_id: Uuid::new_v4(),
        owner: request.owner,
        title: request.title,
        category: request.category,
        patch: request.patch,
    };

    info!(correlation_id = %command.correlation_id, "handling lore.update_entry command");

    let entry = state.facade.update_lore(&command).await?;
    Ok(Json(entry))
}

/// GET /{owner} — the lorebook, optionally narrowed by one search
/// dimension.
async fn lorebook(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(params): Query<LorebookParams>,
) -> Result<Json<Vec<LoreEntry>>, ApiError> {
    let store = state.store.as_ref();
    let entries = if let Some(category) = params.category.as_deref() {
        query_handlers::get_lore_by_category(&owner, category, store).await?
    } else if let Some(tags) = params.tags.as_deref() {
        query_handlers::search_lore_by_tags(&owner, split_list(tags), store).await?
    } else if let Some(characters) = params.characters.as_deref() {
        query_handlers::search_lore_by_characters(&owner, split_list(characters), store).await?
    } else if let Some(location) = params.location.as_deref() {
        query_handlers::get_lore_by_location(&owner, location, store).await?
    } else if let Some(limit) = params.recent {
        query_handlers::get_recent_lore(&owner, limit, store).await?
    } else {
        query_handlers::get_lorebook(&owner, store).await?
    };
    Ok(Json(entries))
}

/// GET /{owner}/stats
async fn stats(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<LorebookStats>, ApiError> {
    let stats = query_handlers::get_lorebook_stats(&owner, state.store.as_ref()).await?;
    Ok(Json(stats))
}

/// GET /{owner}/categories
async fn categories(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = query_handlers::list_lore_categories(&owner, state.store.as_ref()).await?;
    Ok(Json(categories))
}

/// GET /{owner}/tags
async fn tags(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let tags = query_handlers::list_lore_tags(&owner, state.store.as_ref()).await?;
    Ok(Json(tags))
}

/// Returns the router for the lore context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/discover", post(discover))
        .route("/update", post(update))
        .route("/{owner}", get(lorebook))
        .route("/{owner}/stats", get(stats))
        .route("/{owner}/categories", get(categories))
        .route("/{owner}/tags", get(tags))
}
