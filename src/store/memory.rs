use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sea_orm::DbErr;
use serde_json::Value;

use super::CollectionStore;
use crate::expression::{QueryExpression, compare_values};
use crate::models::{SortDirection, SortSpec};

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// In-memory collection of JSON documents.
///
/// Cloning shares the underlying collection.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Objects get `createdAt` / `updatedAt` stamped with
    /// the current time unless they already carry them.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the collection lock is poisoned.
    pub fn insert(&self, mut record: Value) -> Result<(), DbErr> {
        if let Value::Object(fields) = &mut record {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            fields
                .entry(CREATED_AT_FIELD)
                .or_insert_with(|| Value::String(now.clone()));
            fields
                .entry(UPDATED_AT_FIELD)
                .or_insert_with(|| Value::String(now));
        }

        self.records
            .write()
            .map_err(|e| DbErr::Custom(format!("memory store lock poisoned: {e}")))?
            .push(record);
        Ok(())
    }

    /// Add several documents, see [`MemoryStore::insert`].
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the collection lock is poisoned.
    pub fn insert_many<I>(&self, records: I) -> Result<(), DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        records.into_iter().try_for_each(|record| self.insert(record))
    }

    /// # Errors
    ///
    /// Returns a `DbErr` if the collection lock is poisoned.
    pub fn len(&self) -> Result<usize, DbErr> {
        Ok(self.read()?.len())
    }

    /// # Errors
    ///
    /// Returns a `DbErr` if the collection lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, DbErr> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Value>>, DbErr> {
        self.records
            .read()
            .map_err(|e| DbErr::Custom(format!("memory store lock poisoned: {e}")))
    }
}

impl FromIterator<Value> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            records: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl CollectionStore for MemoryStore {
    type Record = Value;

    async fn count(&self, expression: &QueryExpression) -> Result<u64, DbErr> {
        let matching = self.read()?.iter().filter(|r| expression.matches(r)).count();
        Ok(u64::try_from(matching).unwrap_or(u64::MAX))
    }

    async fn find(
        &self,
        expression: &QueryExpression,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>, DbErr> {
        let mut matching: Vec<Value> = self
            .read()?
            .iter()
            .filter(|r| expression.matches(r))
            .cloned()
            .collect();

        // Stable, so ties keep insertion order in both directions.
        matching.sort_by(|a, b| {
            let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(matching
            .into_iter()
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .collect())
    }
}
