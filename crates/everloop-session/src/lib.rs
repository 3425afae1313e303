//! Everloop — Run & Rewind bounded context.
//!
//! Owns the aggregate game state for a session: the checkpoint/rewind
//! engine ("return by death") and the progression façade the
//! presentation layer talks to.

pub mod application;
pub mod domain;
