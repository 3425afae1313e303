//! PostgreSQL implementation of the `LedgerStore` trait.
//!
//! Records live in a single JSONB documents table, unique on
//! `(owner, collection, natural_key)`. Filters compile to JSONB
//! predicates; queries are built dynamically and bound positionally.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use everloop_core::error::ProgressionError;
use everloop_core::store::{Condition, Direction, Filter, LedgerStore, Sort, StoredRecord};

const RECORD_COLUMNS: &str = "id, owner, collection, natural_key, fields, created_at, updated_at";

/// PostgreSQL-backed ledger store.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Creates a new `PgLedgerStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table and indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::Infrastructure` if schema creation fails.
    pub async fn ensure_schema(&self) -> Result<(), ProgressionError> {
        sqlx::raw_sql(crate::schema::CREATE_RECORDS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        tracing::debug!("progression records schema ensured");
        Ok(())
    }
}

fn infra(error: sqlx::Error) -> ProgressionError {
    ProgressionError::Infrastructure(error.to_string())
}

fn record_from_row(row: &PgRow) -> Result<StoredRecord, ProgressionError> {
    Ok(StoredRecord {
        id: row.try_get("id").map_err(infra)?,
        owner: row.try_get("owner").map_err(infra)?,
        collection: row.try_get("collection").map_err(infra)?,
        natural_key: row.try_get("natural_key").map_err(infra)?,
        fields: row.try_get("fields").map_err(infra)?,
        created_at: row.try_get("created_at").map_err(infra)?,
        updated_at: row.try_get("updated_at").map_err(infra)?,
    })
}

/// A positional bind value for dynamically built queries.
enum Bind {
    Json(Value),
    Text(String),
    TextArray(Vec<String>),
}

/// Appends filter predicates to `sql`, starting at placeholder
/// `$next`, and collects the matching bind values in order.
fn push_filter(sql: &mut String, binds: &mut Vec<Bind>, filter: &Filter, mut next: usize) -> usize {
    use std::fmt::Write;

    for condition in &filter.conditions {
        match condition {
            Condition::Eq(field, value) => {
                let _ = write!(sql, " AND fields @> ${next}");
                let mut object = serde_json::Map::new();
                object.insert(field.clone(), value.clone());
                binds.push(Bind::Json(Value::Object(object)));
                next += 1;
            }
            Condition::Gt(field, value) => {
                let _ = write!(sql, " AND fields->${next} > ${}", next + 1);
                binds.push(Bind::Text(field.clone()));
                binds.push(Bind::Json(value.clone()));
                next += 2;
            }
            Condition::Lt(field, value) => {
                let _ = write!(sql, " AND fields->${next} < ${}", next + 1);
                binds.push(Bind::Text(field.clone()));
                binds.push(Bind::Json(value.clone()));
                next += 2;
            }
            Condition::AnyOf(field, values) => {
                let _ = write!(sql, " AND fields->>${next} = ANY(${})", next + 1);
                binds.push(Bind::Text(field.clone()));
                binds.push(Bind::TextArray(values.clone()));
                next += 2;
            }
            Condition::Intersects(field, values) => {
                let _ = write!(sql, " AND fields->${next} ?| ${}", next + 1);
                binds.push(Bind::Text(field.clone()));
                binds.push(Bind::TextArray(values.clone()));
                next += 2;
            }
        }
    }
    next
}

fn apply_binds<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    binds: Vec<Bind>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for bind in binds {
        query = match bind {
            Bind::Json(value) => query.bind(value),
            Bind::Text(text) => query.bind(text),
            Bind::TextArray(values) => query.bind(values),
        };
    }
    query
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn find_one(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
    ) -> Result<Option<StoredRecord>, ProgressionError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM progression_records \
             WHERE owner = $1 AND collection = $2 AND natural_key = $3"
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(collection)
            .bind(natural_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn upsert(
        &self,
        owner: &str,
        collection: &str,
        natural_key: &str,
        fields: Value,
    ) -> Result<StoredRecord, ProgressionError> {
        let sql = format!(
            "INSERT INTO progression_records \
             (id, owner, collection, natural_key, fields, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             ON CONFLICT (owner, collection, natural_key) \
             DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW() \
             RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(owner)
            .bind(collection)
            .bind(natural_key)
            .bind(fields)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        record_from_row(&row)
    }

    async fn find_many(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        sort: &[Sort],
        limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, ProgressionError> {
        use std::fmt::Write;

        let mut sql = format!(
            "SELECT {RECORD_COLUMNS} FROM progression_records \
             WHERE owner = $1 AND collection = $2"
        );
        let mut binds = Vec::new();
        let mut next = push_filter(&mut sql, &mut binds, filter, 3);

        sql.push_str(" ORDER BY ");
        for key in sort {
            let direction = match key.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            let _ = write!(sql, "fields->${next} {direction}, ");
            binds.push(Bind::Text(key.field.clone()));
            next += 1;
        }
        // Trailing natural-key tiebreak keeps results deterministic.
        sql.push_str("natural_key ASC");

        if let Some(limit) = limit {
            let _ = write!(sql, " LIMIT {limit}");
        }

        let query = apply_binds(sqlx::query(&sql).bind(owner).bind(collection), binds);
        let rows = query.fetch_all(&self.pool).await.map_err(infra)?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, ProgressionError> {
        let mut sql = String::from(
            "SELECT COUNT(*) AS cnt FROM progression_records \
             WHERE owner = $1 AND collection = $2",
        );
        let mut binds = Vec::new();
        push_filter(&mut sql, &mut binds, filter, 3);

        let query = apply_binds(sqlx::query(&sql).bind(owner).bind(collection), binds);
        let row = query.fetch_one(&self.pool).await.map_err(infra)?;
        let count: i64 = row.try_get("cnt").map_err(infra)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn group_count(
        &self,
        owner: &str,
        collection: &str,
        filter: &Filter,
        group_field: &str,
    ) -> Result<HashMap<String, u64>, ProgressionError> {
        let mut sql = String::from(
            "SELECT fields->>$3 AS grp, COUNT(*) AS cnt FROM progression_records \
             WHERE owner = $1 AND collection = $2",
        );
        let mut binds = Vec::new();
        push_filter(&mut sql, &mut binds, filter, 4);
        sql.push_str(" GROUP BY 1");

        let query = apply_binds(
            sqlx::query(&sql).bind(owner).bind(collection).bind(group_field),
            binds,
        );
        let rows = query.fetch_all(&self.pool).await.map_err(infra)?;

        let mut groups = HashMap::new();
        for row in &rows {
            let group: Option<String> = row.try_get("grp").map_err(infra)?;
            let count: i64 = row.try_get("cnt").map_err(infra)?;
            if let Some(group) = group {
                groups.insert(group, u64::try_from(count).unwrap_or_default());
            }
        }
        Ok(groups)
    }
}
