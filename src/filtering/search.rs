use serde::{Deserialize, Serialize};

use crate::models::QueryConfig;

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Free-text search: `term` must occur, ignoring case, in at least one of `fields`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchPredicate {
    pub term: String,
    pub fields: Vec<String>,
}

/// Trim a search term and cap its length, cutting on a character boundary.
fn sanitize_search_term(term: &str) -> String {
    term.trim().chars().take(MAX_SEARCH_QUERY_LENGTH).collect()
}

/// Build the search predicate for a route.
///
/// No predicate is produced for an absent or blank term, or when the route
/// has no search fields.
#[must_use]
pub fn parse_search(search: Option<&str>, config: &QueryConfig) -> Option<SearchPredicate> {
    if config.search_fields.is_empty() {
        return None;
    }

    let term = sanitize_search_term(search?);
    if term.is_empty() {
        return None;
    }

    Some(SearchPredicate {
        term,
        fields: config.search_fields.clone(),
    })
}

/// Make `%`, `_` and the escape character itself literal inside a
/// `LIKE ... ESCAPE '\'` pattern.
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    // Backslash goes first so the escapes added below stay single
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
