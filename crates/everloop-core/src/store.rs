//! Ledger store abstraction.
//!
//! Every ledger persists its records through this contract: type-erased
//! JSON documents keyed by `(owner, collection, natural key)`. Natural
//! keys are composite case-sensitive strings; uniqueness enforcement
//! happens at this key, never on a generated id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ProgressionError;

/// Separator used inside composite natural keys. An ASCII unit separator
/// cannot collide with user-visible field content.
pub const KEY_SEPARATOR: &str = "\u{1f}";

/// Joins business fields into a composite natural key.
#[must_use]
pub fn composite_key(parts: &[&str]) -> String {
    parts.join(KEY_SEPARATOR)
}

/// Stored representation of a ledger record.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// Surrogate identifier assigned on first insert.
    pub id: Uuid,
    /// Owner of the record.
    pub owner: String,
    /// Collection the record belongs to.
    pub collection: String,
    /// Composite natural key within the collection.
    pub natural_key: String,
    /// Serialized record payload.
    pub fields: serde_json::Value,
    /// Timestamp of first insert.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent upsert.
    pub updated_at: DateTime<Utc>,
}

/// A single predicate over a record payload field.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Field equals the given JSON value.
    Eq(String, serde_json::Value),
    /// Field is strictly greater than the given JSON value.
    Gt(String, serde_json::Value),
    /// Field is strictly less than the given JSON value.
    Lt(String, serde_json::Value),
    /// Scalar field matches any of the given values.
    AnyOf(String, Vec<String>),
    /// Array field shares at least one element with the given values.
    Intersects(String, Vec<String>),
}

/// Conjunction of field predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Predicates; all must hold for a record to match.
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality predicate.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_owned(), value.into()));
        self
    }

    /// Adds a greater-than predicate.
    #[must_use]
    pub fn gt(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.conditions
            .push(Condition::Gt(field.to_owned(), value.into()));
        self
    }

    /// Adds a less-than predicate.
    #[must_use]
    pub fn lt(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.conditions
            .push(Condition::Lt(field.to_owned(), value.into()));
        self
    }

    /// Adds a scalar-in-set predicate.
    #[must_use]
    pub fn any_of(mut self, field: &str, values: Vec<String>) -> Self {
        self.conditions
            .push(Condition::AnyOf(field.to_owned(), values));
        self
    }

    /// Adds an array-intersects-set predicate.
    #[must_use]
    pub fn intersects(mut self, field: &str, values: Vec<String>) -> Self {
        self.conditions
            .push(Condition::Intersects(field.to_owned(), values));
        self
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// A single sort key over a record payload field.
#[derive(Debug, Clone)]
pub struct Sort {
    /// Field to sort on.
    pub field: String,
    /// Direction to sort in.
    pub direction: Direction,
}

impl Sort {
    /// Ascending sort on `field`.
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Asc,
        }
    }

    /// Descending sort on `field`.
    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Desc,
        }
    }
}

/// Repository trait for ledger records.
///
/// Upserts are last-write-wins per natural key, which makes individual
/// mutations idempotent-safe against retries. No cross-record transaction
/// is offered; callers must tolerate partial application across entities.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Loads a single record by natural key.
    async fn find_one(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
    ) -> Result<Option<StoredRecord>, ProgressionError>;

    /// Inserts or fully replaces the record at the natural key.
    async fn upsert(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
        fields: serde_json::Value,
    ) -> Result<StoredRecord, ProgressionError>;

    /// Lists records matching `filter`, ordered by `sort`, optionally
    /// truncated to `limit`.
    async fn find_many(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        sort: &[Sort],
        limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, ProgressionError>;

    /// Counts records matching `filter`.
    async fn count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, ProgressionError>;

    /// Counts records matching `filter`, grouped by the string value of
    /// `group_field`. Records missing the field are not counted.
    async fn group_count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        group_field: &str,
    ) -> Result<HashMap<String, u64>, ProgressionError>;
}

/// Serializes a record payload for storage.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, ProgressionError> {
    serde_json::to_value(value)
        .map_err(|e| ProgressionError::Infrastructure(format!("record encode failed: {e}")))
}

/// Deserializes a stored record payload back into its typed form.
///
/// # Errors
///
/// Returns `ProgressionError::Infrastructure` if the payload does not
/// match the expected shape.
pub fn decode<T: DeserializeOwned>(record: &StoredRecord) -> Result<T, ProgressionError> {
    serde_json::from_value(record.fields.clone()).map_err(|e| {
        ProgressionError::Infrastructure(format!(
            "record decode failed for {}/{}: {e}",
            record.collection, record.natural_key
        ))
    })
}
