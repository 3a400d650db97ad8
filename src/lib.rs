pub mod errors;
pub mod executor;
pub mod expression;
pub mod filtering;
pub mod models;
pub mod store;

pub use errors::ApiError;
pub use executor::{QueryBuilder, execute, query_builder};
pub use expression::{QueryExpression, compose};
pub use filtering::{ParsedQuery, RawParameters, parse};
pub use models::{ListParams, QueryConfig, QueryResult, SortDirection, SortSpec};
pub use store::{CollectionStore, MemoryStore, SeaOrmStore};
