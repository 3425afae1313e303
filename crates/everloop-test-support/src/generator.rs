//! Test generators — mock `NarrativeGenerator` implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use everloop_core::error::ProgressionError;
use everloop_core::generator::{NarrativeGenerator, NarrativeRequest, NarrativeResponse};

/// A narrative generator that replays a queue of scripted responses and
/// records every request it receives. An exhausted queue fails with an
/// external-service error.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<NarrativeResponse>>,
    requests: Mutex<Vec<NarrativeRequest>>,
}

impl ScriptedGenerator {
    /// Creates a generator that will return `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<NarrativeResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a generator that returns one scripted continuation.
    #[must_use]
    pub fn single(scenario: &str, choices: &[&str]) -> Self {
        Self::new(vec![NarrativeResponse {
            scenario: scenario.to_owned(),
            choices: choices.iter().map(|&c| c.to_owned()).collect(),
        }])
    }

    /// Returns a snapshot of all requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<NarrativeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedGenerator {
    async fn continue_story(
        &self,
        request: &NarrativeRequest,
    ) -> Result<NarrativeResponse, ProgressionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProgressionError::ExternalService("scripted responses exhausted".into()))
    }
}

/// A narrative generator whose calls always fail.
#[derive(Debug)]
pub struct FailingGenerator;

#[async_trait]
impl NarrativeGenerator for FailingGenerator {
    async fn continue_story(
        &self,
        _request: &NarrativeRequest,
    ) -> Result<NarrativeResponse, ProgressionError> {
        Err(ProgressionError::ExternalService(
            "narrative service unreachable".into(),
        ))
    }
}
