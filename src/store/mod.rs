//! # Collection Stores
//!
//! The engine reads records through [`CollectionStore`], which needs only a
//! filtered count and a filtered, sorted, paginated fetch.
//!
//! - [`MemoryStore`]: JSON documents in memory, evaluated directly against the
//!   expression tree. Useful for tests and small fixed datasets.
//! - [`SeaOrmStore`]: any Sea-ORM entity, with the expression translated to a
//!   Sea-ORM [`Condition`](sea_orm::Condition).

pub mod memory;
pub mod seaorm;

use sea_orm::DbErr;
use async_trait::async_trait;

use crate::expression::QueryExpression;
use crate::models::SortSpec;

pub use memory::MemoryStore;
pub use seaorm::{SeaOrmStore, to_condition};

#[async_trait]
pub trait CollectionStore: Send + Sync {
    type Record: Send;

    /// Number of records matching `expression`, ignoring pagination.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the store cannot be read.
    async fn count(&self, expression: &QueryExpression) -> Result<u64, DbErr>;

    /// Records matching `expression`, ordered by `sort`, after skipping `skip`
    /// and returning at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the store cannot be read.
    async fn find(
        &self,
        expression: &QueryExpression,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self::Record>, DbErr>;
}
