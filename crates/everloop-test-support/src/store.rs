//! Test stores — failing `LedgerStore` implementation for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use everloop_core::error::ProgressionError;
use everloop_core::store::{Filter, LedgerStore, Sort, StoredRecord};

/// A ledger store that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingLedgerStore;

fn refused() -> ProgressionError {
    ProgressionError::Infrastructure("connection refused".into())
}

#[async_trait]
impl LedgerStore for FailingLedgerStore {
    async fn find_one(
        &self,
        _owner: &str,
        _collection: &str,
        _natural_key: &str,
    ) -> Result<Option<StoredRecord>, ProgressionError> {
        Err(refused())
    }

    async fn upsert(
        &self,
        _owner: &str,
        _collection: &str,
        _natural_key: &str,
        _fields: serde_json::Value,
    ) -> Result<StoredRecord, ProgressionError> {
        Err(refused())
    }

    async fn find_many(
        &self,
        _owner: &str,
        _collection: &str,
        _filter: &Filter,
        _sort: &[Sort],
        _limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, ProgressionError> {
        Err(refused())
    }

    async fn count(
        &self,
        _owner: &str,
        _collection: &str,
        _filter: &Filter,
    ) -> Result<u64, ProgressionError> {
        Err(refused())
    }

    async fn group_count(
        &self,
        _owner: &str,
        _collection: &str,
        _filter: &Filter,
        _group_field: &str,
    ) -> Result<HashMap<String, u64>, ProgressionError> {
        Err(refused())
    }
}
