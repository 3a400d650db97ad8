//! # Query Execution
//!
//! [`execute`] runs a composed expression against a
//! [`CollectionStore`] and assembles the [`QueryResult`] envelope.
//! [`QueryBuilder`] bundles a route's [`QueryConfig`] with the whole
//! parse → compose → execute pipeline.
//!
//! ```rust,ignore
//! static PLANTS: LazyLock<QueryBuilder> = LazyLock::new(|| {
//!     QueryBuilder::new(
//!         QueryConfig::new("createdAt")
//!             .with_limits(5, 50)
//!             .with_sort_fields(["name", "status", "createdAt", "updatedAt"])
//!             .with_filter_fields(["name", "description", "status", "category"])
//!             .with_search_fields(["name", "description"]),
//!     )
//! });
//!
//! async fn list_plants(
//!     State(store): State<MemoryStore>,
//!     params: RawParameters,
//! ) -> Result<Json<QueryResult<Value>>, ApiError> {
//!     Ok(Json(PLANTS.list(&params, &store).await?))
//! }
//! ```
//!
//! The count and the page are read concurrently and not in one transaction,
//! so under concurrent writes `total` may disagree slightly with `data`.

use sea_orm::DbErr;

use crate::expression::{QueryExpression, compose};
use crate::filtering::query_parser::{ParsedQuery, RawParameters, parse};
use crate::models::{QueryConfig, QueryResult, SortSpec};
use crate::store::CollectionStore;

/// Count and fetch one page of records matching `expression`.
///
/// `page` in the result is derived from `skip` and `limit`;
/// [`QueryBuilder`] overwrites it with the page the request parsed to.
///
/// # Errors
///
/// Returns the store's `DbErr` unchanged if either read fails. Nothing is
/// retried.
pub async fn execute<S>(
    expression: &QueryExpression,
    sort: &SortSpec,
    skip: u64,
    limit: u64,
    store: &S,
) -> Result<QueryResult<S::Record>, DbErr>
where
    S: CollectionStore + ?Sized,
{
    let limit = limit.max(1);

    let (total, data) = tokio::try_join!(
        store.count(expression),
        store.find(expression, sort, skip, limit),
    )?;

    let page = skip / limit + 1;
    tracing::debug!(total, page, limit, returned = data.len(), "Listing query executed");

    Ok(QueryResult::new(data, total, page, limit))
}

/// A route's listing query engine.
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    config: QueryConfig,
}

impl QueryBuilder {
    #[must_use]
    pub const fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Validate raw parameters against this route's configuration.
    #[must_use]
    pub fn parse(&self, raw: &RawParameters) -> ParsedQuery {
        parse(raw, &self.config)
    }

    /// Parse, compose and execute in one step.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the store fails.
    pub async fn list<S>(
        &self,
        raw: &RawParameters,
        store: &S,
    ) -> Result<QueryResult<S::Record>, DbErr>
    where
        S: CollectionStore + ?Sized,
    {
        self.list_parsed(&self.parse(raw), store).await
    }

    /// Execute an already parsed query, for callers that rewrite filters
    /// between parsing and execution.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the store fails.
    pub async fn list_parsed<S>(
        &self,
        parsed: &ParsedQuery,
        store: &S,
    ) -> Result<QueryResult<S::Record>, DbErr>
    where
        S: CollectionStore + ?Sized,
    {
        let expression = compose(parsed);
        let mut result = execute(&expression, &parsed.sort, parsed.skip, parsed.limit, store).await?;
        result.page = parsed.page;
        Ok(result)
    }
}

/// One-shot form of [`QueryBuilder::list`].
///
/// # Errors
///
/// Returns a `DbErr` if the store fails.
pub async fn query_builder<S>(
    store: &S,
    raw: &RawParameters,
    config: &QueryConfig,
) -> Result<QueryResult<S::Record>, DbErr>
where
    S: CollectionStore + ?Sized,
{
    let parsed = parse(raw, config);
    let mut result = execute(&compose(&parsed), &parsed.sort, parsed.skip, parsed.limit, store).await?;
    result.page = parsed.page;
    Ok(result)
}
