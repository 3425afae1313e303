//! In-memory implementation of the `LedgerStore` trait.
//!
//! The reference backend: every filter, sort, and grouping behavior the
//! PostgreSQL store expresses in SQL is implemented here directly over
//! the decoded payloads. Used when no `DATABASE_URL` is configured and
//! throughout the test suites.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use everloop_core::error::ProgressionError;
use everloop_core::store::{Condition, Direction, Filter, LedgerStore, Sort, StoredRecord};

type RecordKey = (String, String, String);

/// Ledger store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    records: Mutex<HashMap<RecordKey, StoredRecord>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<RecordKey, StoredRecord>>, ProgressionError> {
        self.records
            .lock()
            .map_err(|_| ProgressionError::Infrastructure("ledger store mutex poisoned".into()))
    }
}

static NULL: Value = Value::Null;

fn field<'a>(fields: &'a Value, name: &str) -> &'a Value {
    fields.get(name).unwrap_or(&NULL)
}

/// Total order over JSON scalars: numbers numerically, strings
/// chronologically when both parse as timestamps and lexicographically
/// otherwise, with nulls first.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn matches(fields: &Value, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(name, value) => field(fields, name) == value,
        Condition::Gt(name, value) => {
            let actual = field(fields, name);
            !actual.is_null() && compare_values(actual, value) == Ordering::Greater
        }
        Condition::Lt(name, value) => {
            let actual = field(fields, name);
            !actual.is_null() && compare_values(actual, value) == Ordering::Less
        }
        Condition::AnyOf(name, values) => field(fields, name)
            .as_str()
            .is_some_and(|actual| values.iter().any(|v| v == actual)),
        Condition::Intersects(name, values) => field(fields, name)
            .as_array()
            .is_some_and(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|item| values.iter().any(|v| v == item))
            }),
    }
}

fn matches_all(record: &StoredRecord, filter: &Filter) -> bool {
    filter
        .conditions
        .iter()
        .all(|condition| matches(&record.fields, condition))
}

fn sort_records(records: &mut [StoredRecord], sort: &[Sort]) {
    records.sort_by(|a, b| {
        for key in sort {
            let ordering = compare_values(field(&a.fields, &key.field), field(&b.fields, &key.field));
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        // Ties break on natural key so results are deterministic.
        a.natural_key.cmp(&b.natural_key)
    });
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_one(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
    ) -> Result<Option<StoredRecord>, ProgressionError> {
        let records = self.guard()?;
        let key = (
            owner.to_owned(),
            collection.to_owned(),
            natural_key.to_owned(),
        );
        Ok(records.get(&key).cloned())
    }

    async fn upsert(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
        fields: Value,
    ) -> Result<StoredRecord, ProgressionError> {
        let mut records = self.guard()?;
        let key = (
            owner.to_owned(),
            collection.to_owned(),
            natural_key.to_owned(),
        );
        let now = Utc::now();
        let record = records
            .entry(key)
            .and_modify(|existing| {
                existing.fields = fields.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| StoredRecord {
                id: Uuid::new_v4(),
                owner: owner.to_owned(),
                collection: collection.to_owned(),
                natural_key: natural_key.to_owned(),
                fields,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn find_many(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        sort: &[Sort],
        limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, ProgressionError> {
        let records = self.guard()?;
        let mut found: Vec<StoredRecord> = records
            .values()
            .filter(|r| r.owner == owner && r.collection == collection)
            .filter(|r| matches_all(r, filter))
            .cloned()
            .collect();
        sort_records(&mut found, sort);
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, ProgressionError> {
        let records = self.guard()?;
        let count = records
            .values()
            .filter(|r| r.owner == owner && r.collection == collection)
            .filter(|r| matches_all(r, filter))
            .count();
        Ok(count as u64)
    }

    async fn group_count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        group_field: &str,
    ) -> Result<HashMap<String, u64>, ProgressionError> {
        let records = self.guard()?;
        let mut groups: HashMap<String, u64> = HashMap::new();
        for record in records
            .values()
            .filter(|r| r.owner == owner && r.collection == collection)
            .filter(|r| matches_all(r, filter))
        {
            if let Some(group) = field(&record.fields, group_field).as_str() {
                *groups.entry(group.to_owned()).or_insert(0) += 1;
            }
        }
        Ok(groups)
    }
}
