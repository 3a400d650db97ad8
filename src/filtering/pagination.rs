use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};

use crate::models::{QueryConfig, QueryResult};

/// Parse an integer parameter, treating anything non-numeric as absent.
fn parse_integer(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

/// Resolve the 1-based page number. Non-numeric input means page 1; anything
/// below 1 is clamped up.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    parse_integer(raw).map_or(1, |page| page.max(1).unsigned_abs())
}

/// Resolve the page size against the route's limits.
///
/// Non-numeric input falls back to `default_limit`; the result always lies
/// in `[1, max_limit]`.
#[must_use]
pub fn parse_limit(raw: Option<&str>, config: &QueryConfig) -> u64 {
    let max_limit = config.effective_max_limit();
    parse_integer(raw).map_or_else(
        || config.effective_default_limit(),
        |limit| limit.max(1).unsigned_abs().min(max_limit),
    )
}

/// Largest offset any store has to accept; SQL drivers bind offsets as `i64`.
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Highest page whose offset still fits in [`MAX_OFFSET`] at this `limit`.
#[must_use]
pub const fn max_page(limit: u64) -> u64 {
    let limit = if limit == 0 { 1 } else { limit };
    MAX_OFFSET / limit + 1
}

/// Number of records to skip before `page`. Page 1 skips nothing.
#[must_use]
pub const fn skip_for(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// `ceil(total / limit)`, and 0 when there is nothing to page through.
#[must_use]
pub const fn total_pages(total: u64, limit: u64) -> u64 {
    if total == 0 || limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build a `Content-Range` header for a page of results.
///
/// # Arguments
///
/// * `offset` - Index of the first record on the page.
/// * `limit` - Page size.
/// * `total_count` - Number of records matching the query.
/// * `resource_name` - Unit named in the header, e.g. `plants`.
///
/// Control characters are stripped from `resource_name`, so the header is
/// always valid.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let last = offset
        .saturating_add(limit)
        .saturating_sub(1)
        .min(total_count.saturating_sub(1));

    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{last}/{total_count}");

    let value = HeaderValue::from_str(&content_range).unwrap_or_else(|_| {
        HeaderValue::from_str(&format!("items {offset}-{last}/{total_count}"))
            .unwrap_or(HeaderValue::from_static("items 0-0/0"))
    });

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_RANGE, value);
    headers
}

impl<R> QueryResult<R> {
    /// `Content-Range` header describing this page, for React Admin style clients.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        calculate_content_range(
            skip_for(self.page, self.limit),
            self.limit,
            self.total,
            resource_name,
        )
    }
}
