//! Everloop — Faction Reputation bounded context.
//!
//! Responsible for the bounded reputation ledger: capped delta
//! application, the append-only change history, and tier-based title
//! derivation.

pub mod application;
pub mod domain;
