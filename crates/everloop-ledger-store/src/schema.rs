//! Ledger store database schema.

/// SQL to create the progression records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS progression_records (
    id          UUID PRIMARY KEY,
    owner       VARCHAR(255) NOT NULL,
    collection  VARCHAR(64) NOT NULL,
    natural_key TEXT NOT NULL,
    fields      JSONB NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (owner, collection, natural_key)
);

CREATE INDEX IF NOT EXISTS idx_progression_records_scope
    ON progression_records (owner, collection);
";
