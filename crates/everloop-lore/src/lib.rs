//! Everloop — Lore Registry bounded context.
//!
//! Responsible for discoverable narrative lore: uniqueness per
//! (title, category), reveal-in-place semantics, and the lorebook
//! search surface.

pub mod application;
pub mod domain;
