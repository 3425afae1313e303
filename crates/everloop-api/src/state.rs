//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use everloop_core::clock::Clock;
use everloop_core::generator::NarrativeGenerator;
use everloop_core::store::LedgerStore;
use everloop_session::application::facade::ProgressionFacade;
use everloop_session::domain::state::GameState;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger store backing every context.
    pub store: Arc<dyn LedgerStore>,
    /// The progression façade.
    pub facade: Arc<ProgressionFacade>,
    /// Live game sessions, one aggregate state per session id. The
    /// write lock is what gives each session its single-mutator
    /// guarantee.
    pub sessions: Arc<RwLock<HashMap<Uuid, GameState>>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        generator: Arc<dyn NarrativeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let facade = Arc::new(ProgressionFacade::new(store.clone(), generator, clock));
        Self {
            store,
            facade,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
