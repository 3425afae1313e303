//! HTTP adapter for the narrative generator.
//!
//! The generator is reached as plain request/response JSON over a
//! configured endpoint. Transport failures and unparseable bodies both
//! surface as `ExternalService`; retry policy lives with the caller
//! (the rewind engine already degrades gracefully).

use std::time::Duration;

use async_trait::async_trait;

use everloop_core::error::ProgressionError;
use everloop_core::generator::{NarrativeGenerator, NarrativeRequest, NarrativeResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Narrative generator client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNarrativeGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNarrativeGenerator {
    /// Creates a client posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for HttpNarrativeGenerator {
    async fn continue_story(
        &self,
        request: &NarrativeRequest,
    ) -> Result<NarrativeResponse, ProgressionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| ProgressionError::ExternalService(format!("narrative request failed: {e}")))?
            .error_for_status()
            .map_err(|e| {
                ProgressionError::ExternalService(format!("narrative request rejected: {e}"))
            })?;

        response.json::<NarrativeResponse>().await.map_err(|e| {
            ProgressionError::ExternalService(format!("narrative response unparseable: {e}"))
        })
    }
}
