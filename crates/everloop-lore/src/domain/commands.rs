//! Commands for the Lore Registry context.

use everloop_core::command::Command;
use uuid::Uuid;

use super::records::{LoreDraft, LorePatch};

/// Command to discover a lore entry.
#[derive(Debug, Clone)]
pub struct DiscoverLore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The discovering player.
    pub owner: String,
    /// The entry being discovered.
    pub entry: LoreDraft,
}

impl Command for DiscoverLore {
    fn command_type(&self) -> &'static str {
        "lore.discover"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to correct an existing lore entry's fields.
#[derive(Debug, Clone)]
pub struct UpdateLoreEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning player.
    pub owner: String,
    /// Title of the entry to patch.
    pub title: String,
    /// Category of the entry to patch.
    pub category: String,
    /// The correction to apply.
    pub patch: LorePatch,
}

impl Command for UpdateLoreEntry {
    fn command_type(&self) -> &'static str {
        "lore.update_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
