//! Everloop — Environmental Registry bounded context.
//!
//! Responsible for discoverable world-interaction points: uniqueness
//! per (location, description), link validation toward quests and lore,
//! and the surroundings listing surface.

pub mod application;
pub mod domain;
