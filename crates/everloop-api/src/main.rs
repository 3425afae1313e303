//! Everloop API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use everloop_api::narrator::HttpNarrativeGenerator;
use everloop_api::{routes, state};
use everloop_core::clock::SystemClock;
use everloop_core::store::LedgerStore;
use everloop_ledger_store::memory_ledger_store::InMemoryLedgerStore;
use everloop_ledger_store::pg_ledger_store::PgLedgerStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Everloop API server");

    // Read configuration from environment.
    let narrator_url = std::env::var("NARRATOR_URL")
        .map_err(|_| "NARRATOR_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;

    // Select the ledger store backend. Without a DATABASE_URL the
    // server runs on the in-memory store: playable, nothing survives a
    // restart.
    let store: Arc<dyn LedgerStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await?;
            let store = PgLedgerStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!("using PostgreSQL ledger store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory ledger store");
            Arc::new(InMemoryLedgerStore::new())
        }
    };

    // Build application state.
    let generator = Arc::new(HttpNarrativeGenerator::new(narrator_url));
    let app_state = state::AppState::new(store, generator, Arc::new(SystemClock));

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
