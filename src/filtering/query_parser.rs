use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use super::conditions::{FilterPredicate, parse_filters};
use super::date_range::{DateRange, parse_date_range};
use super::pagination::{max_page, parse_limit, parse_page, skip_for};
use super::search::{SearchPredicate, parse_search};
use super::sort::parse_sorting;
use crate::models::{QueryConfig, SortSpec};

/// Untrusted query-string parameters, in request order.
///
/// Keys may repeat; a repeated `filter[<field>]` contributes all of its
/// values, while scalar keys (`sort`, `page`, ...) use their first
/// occurrence.
///
/// In an axum handler the type is an extractor that never rejects:
///
/// ```rust,ignore
/// async fn list_plants(
///     State(store): State<PlantStore>,
///     params: RawParameters,
/// ) -> Result<Json<QueryResult<Value>>, ApiError> {
///     Ok(Json(PLANTS.list(&params, &store).await?))
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawParameters {
    pairs: Vec<(String, String)>,
}

impl RawParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    /// Invalid percent-encoding and UTF-8 are decoded lossily.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `key`, in request order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S> FromRequestParts<S> for RawParameters
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .uri
            .query()
            .map_or_else(Self::default, Self::from_query_str))
    }
}

/// A validated listing request.
///
/// Built by [`parse`]; every field already respects the route's whitelists
/// and limits.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParsedQuery {
    pub filters: Vec<FilterPredicate>,
    pub sort: SortSpec,
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
    pub search: Option<SearchPredicate>,
    pub date_range: Option<DateRange>,
}

impl ParsedQuery {
    /// Values of the filter on `field`, if the request filters on it.
    #[must_use]
    pub fn filter_values(&self, field: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|predicate| predicate.field == field)
            .map(|predicate| predicate.values.as_slice())
    }

    /// Replace the value set of an existing filter, e.g. after resolving
    /// names to identifiers. An empty `values` removes the filter. Fields the
    /// request did not filter on are left untouched, so the whitelist still
    /// decides which fields are filtered.
    #[must_use]
    pub fn with_filter_values<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.filters.retain(|predicate| predicate.field != field);
        } else if let Some(predicate) = self.filters.iter_mut().find(|p| p.field == field) {
            predicate.values = values;
        }
        self
    }
}

/// Turn raw parameters into a [`ParsedQuery`]. Never fails: malformed or
/// disallowed input falls back to the route's defaults.
#[must_use]
pub fn parse(raw: &RawParameters, config: &QueryConfig) -> ParsedQuery {
    let limit = parse_limit(raw.get("limit"), config);
    let page = parse_page(raw.get("page")).min(max_page(limit));

    ParsedQuery {
        filters: parse_filters(raw, config),
        sort: parse_sorting(raw.get("sort"), config),
        page,
        limit,
        skip: skip_for(page, limit),
        search: parse_search(raw.get("search"), config),
        date_range: parse_date_range(raw.get("date_from"), raw.get("date_to"), config),
    }
}
