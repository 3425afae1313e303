//! Everloop — Quest Ledger bounded context.
//!
//! Responsible for the quest lifecycle state machine: prerequisite
//! validation at creation, objective-driven auto-completion, and the
//! one-way move into the archived collection.

pub mod application;
pub mod domain;
