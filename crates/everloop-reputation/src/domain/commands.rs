//! Commands for the Faction Reputation context.

use everloop_core::command::Command;
use uuid::Uuid;

/// Command to adjust the player's standing with a faction.
#[derive(Debug, Clone)]
pub struct AdjustReputation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player whose standing changes.
    pub owner: String,
    /// The faction, case-sensitive.
    pub faction: String,
    /// Raw requested delta; capped by policy before application.
    pub delta: i32,
    /// Why the standing changes.
    pub reason: String,
    /// Optional reference to the cause.
    pub source: Option<String>,
}

impl Command for AdjustReputation {
    fn command_type(&self) -> &'static str {
        "reputation.adjust"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
