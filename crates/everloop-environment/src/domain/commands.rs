//! Commands for the Environmental Registry context.

use everloop_core::command::Command;
use uuid::Uuid;

use super::records::EnvironmentalDraft;

/// Command to discover an environmental detail.
#[derive(Debug, Clone)]
pub struct DiscoverDetail {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The discovering player.
    pub owner: String,
    /// The detail being discovered.
    pub detail: EnvironmentalDraft,
}

impl Command for DiscoverDetail {
    fn command_type(&self) -> &'static str {
        "environment.discover_detail"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
