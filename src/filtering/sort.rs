use crate::models::{QueryConfig, SortDirection, SortSpec};

const DESCENDING_PREFIX: char = '-';

/// Split `-field` / `field` into the bare field name and a direction.
fn split_direction(sort: &str) -> (&str, SortDirection) {
    sort.strip_prefix(DESCENDING_PREFIX)
        .map_or((sort, SortDirection::Asc), |field| {
            (field, SortDirection::Desc)
        })
}

/// Resolve the `sort` parameter against the route's whitelist.
///
/// Anything that does not name an allowed field, including an absent or
/// blank parameter, sorts ascending by `default_sort`.
#[must_use]
pub fn parse_sorting(sort: Option<&str>, config: &QueryConfig) -> SortSpec {
    let fallback = || SortSpec::asc(config.default_sort.clone());

    let Some(sort) = sort.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback();
    };

    let (field, direction) = split_direction(sort);
    let field = field.trim();

    if config.is_sortable(field) {
        SortSpec::new(field, direction)
    } else {
        tracing::debug!(field = %field, "Sort field not allowed, using default sort");
        fallback()
    }
}
