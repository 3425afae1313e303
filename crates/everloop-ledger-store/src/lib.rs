//! Everloop — Ledger store implementations.
//!
//! Two backends for the `LedgerStore` contract: a PostgreSQL JSONB
//! documents table for production and an in-memory map for DB-less
//! operation and tests.

pub mod memory_ledger_store;
pub mod pg_ledger_store;
pub mod schema;
