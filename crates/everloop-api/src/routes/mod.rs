//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod environment;
pub mod game;
pub mod health;
pub mod lore;
pub mod quests;
pub mod reputation;

/// Assembles the full application router. Layers (tracing, CORS) are
/// the binary's concern.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/game", game::router())
        .nest("/api/v1/quests", quests::router())
        .nest("/api/v1/lore", lore::router())
        .nest("/api/v1/reputation", reputation::router())
        .nest("/api/v1/environment", environment::router())
        .with_state(state)
}
