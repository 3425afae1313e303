//! Narrative generator contract.
//!
//! The generator is an external collaborator consumed strictly as
//! request/response; no transport, retry, or prompt semantics are
//! defined here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;

/// Request sent to the narrative generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeRequest {
    /// Scenario text the continuation starts from.
    pub prior_scenario: String,
    /// Choices the player took within the current loop.
    pub prior_choices: Vec<String>,
    /// Outcome text that ended the prior attempt.
    pub outcome: String,
}

/// Response produced by the narrative generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeResponse {
    /// The new scenario text.
    pub scenario: String,
    /// The new choices presented to the player.
    pub choices: Vec<String>,
}

/// Trait for the external narrative generation service.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Requests a narrative continuation.
    async fn continue_story(
        &self,
        request: &NarrativeRequest,
    ) -> Result<NarrativeResponse, ProgressionError>;
}
