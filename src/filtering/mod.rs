//! # Query Parameter Parsing
//!
//! Turns the untrusted query string of a listing request into a
//! [`ParsedQuery`]. Every dimension is validated against the route's
//! [`QueryConfig`](crate::QueryConfig) and degrades to a default instead of
//! failing.
//!
//! ## Main Components
//!
//! - **[`RawParameters`]**: ordered query-string multimap, also an axum extractor
//! - **[`parse`]**: the full parser
//! - **[`parse_filters`]**: `filter[<field>]` whitelisting and IN sets
//! - **[`parse_sorting`]**: `sort` with `-` for descending
//! - **[`parse_search`]**: free-text search across configured fields
//! - **[`parse_date_range`]**: `date_from` / `date_to`
//! - **[`parse_page`] / [`parse_limit`]**: clamped pagination
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Name A-Z
//! GET /api/plants?sort=name
//!
//! // Newest first
//! GET /api/plants?sort=-createdAt
//!
//! // Only active plants
//! GET /api/plants?filter[status]=active
//!
//! // Name is one of two values (IN)
//! GET /api/plants?filter[name]=rose,daisy
//!
//! // Search name and description
//! GET /api/plants?search=green
//!
//! // Second page of five
//! GET /api/plants?page=2&limit=5
//!
//! // Created on or after a date
//! GET /api/plants?date_from=2024-01-01
//! ```

pub mod conditions;
pub mod date_range;
pub mod pagination;
pub mod query_parser;
pub mod search;
pub mod sort;

pub use conditions::{FilterPredicate, is_valid_field_name, parse_filters};
pub use date_range::{DateRange, parse_date, parse_date_range};
pub use pagination::{
    MAX_OFFSET, calculate_content_range, max_page, parse_limit, parse_page, skip_for, total_pages,
};
pub use query_parser::{ParsedQuery, RawParameters, parse};
pub use search::{SearchPredicate, escape_like_wildcards, parse_search};
pub use sort::parse_sorting;
