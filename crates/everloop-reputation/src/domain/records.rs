//! Reputation records and the standing-title derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single audited change to a faction's standing. History entries are
/// appended in call order and never truncated or rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationChange {
    /// The delta actually applied, after the per-call cap.
    pub amount: i32,
    /// Why the standing changed.
    pub reason: String,
    /// Optional reference to whatever caused the change (quest id,
    /// dialogue beat, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

/// The player's standing with one faction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionReputation {
    /// Faction name; case-sensitive, doubles as the natural key.
    pub faction: String,
    /// Current standing, always within the policy bounds.
    pub level: i32,
    /// Display title, a pure function of faction and level.
    pub title: String,
    /// Append-only audit trail of every applied change.
    pub history: Vec<ReputationChange>,
}

impl FactionReputation {
    /// Store collection for reputation records.
    pub const COLLECTION: &'static str = "reputations";

    /// Natural key for a faction. Owner scoping is the store's concern.
    #[must_use]
    pub fn natural_key(faction: &str) -> String {
        faction.to_owned()
    }

    /// A fresh record for a faction the player has no history with.
    #[must_use]
    pub fn neutral(faction: &str) -> Self {
        Self {
            faction: faction.to_owned(),
            level: 0,
            title: title_for(faction, 0),
            history: Vec::new(),
        }
    }
}

/// Derives the display title for a faction at a given standing.
///
/// Band boundaries sit at every 20 points; the title is always the
/// faction name followed by the band label.
#[must_use]
pub fn title_for(faction: &str, level: i32) -> String {
    let band = match level {
        l if l >= 80 => "Champion",
        l if l >= 60 => "Hero",
        l if l >= 40 => "Ally",
        l if l >= 20 => "Friend",
        l if l >= 0 => "Neutral",
        l if l >= -20 => "Unfriendly",
        l if l >= -40 => "Hostile",
        l if l >= -60 => "Enemy",
        l if l >= -80 => "Nemesis",
        _ => "Pariah",
    };
    format!("{faction} {band}")
}

/// Bounds applied to reputation adjustments. The per-call cap is policy,
/// not a structural invariant, so it stays configurable.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentPolicy {
    /// Maximum magnitude a single adjustment may carry.
    pub per_call_cap: i32,
    /// Lowest reachable standing.
    pub level_floor: i32,
    /// Highest reachable standing.
    pub level_ceiling: i32,
}

impl Default for AdjustmentPolicy {
    fn default() -> Self {
        Self {
            per_call_cap: 20,
            level_floor: -100,
            level_ceiling: 100,
        }
    }
}

impl AdjustmentPolicy {
    /// Caps a raw delta to the per-call bound.
    #[must_use]
    pub fn clamp_delta(&self, raw: i32) -> i32 {
        raw.clamp(-self.per_call_cap, self.per_call_cap)
    }

    /// Clamps an accumulated level into the reachable range.
    #[must_use]
    pub fn clamp_level(&self, level: i32) -> i32 {
        level.clamp(self.level_floor, self.level_ceiling)
    }
}
