use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_LIMIT: u64 = 10;
const DEFAULT_MAX_LIMIT: u64 = 100;
const DEFAULT_SORT_FIELD: &str = "createdAt";
const DEFAULT_DATE_FIELD: &str = "createdAt";

/// Per-route configuration of the listing query engine.
///
/// A configuration is built once per route and shared by every request. The
/// field lists are whitelists: clients can only sort or filter on what is
/// named here.
///
/// # Example
/// ```rust
/// use querycrate::QueryConfig;
///
/// let plants = QueryConfig::new("createdAt")
///     .with_limits(5, 50)
///     .with_sort_fields(["name", "status", "createdAt", "updatedAt"])
///     .with_filter_fields(["name", "description", "status", "category"])
///     .with_search_fields(["name", "description"])
///     .with_date_field("createdAt");
/// assert_eq!(plants.max_limit, 50);
/// ```
///
/// Configurations can also be loaded from JSON; missing keys take the
/// defaults of [`QueryConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size used when the request carries no usable `limit`.
    pub default_limit: u64,
    /// Upper bound for `limit`. A value of 0 behaves as 1.
    pub max_limit: u64,
    /// Sort field used when `sort` is absent or not whitelisted. Always ascending.
    pub default_sort: String,
    /// Fields a client may sort on.
    pub allowed_sort_fields: Vec<String>,
    /// Fields a client may filter on. Empty allows every well-formed field name.
    pub allowed_filter_fields: Vec<String>,
    /// Fields matched by `search`, in order.
    pub search_fields: Vec<String>,
    /// Field that `date_from` / `date_to` are applied to.
    pub date_field: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            default_sort: DEFAULT_SORT_FIELD.to_string(),
            allowed_sort_fields: Vec::new(),
            allowed_filter_fields: Vec::new(),
            search_fields: Vec::new(),
            date_field: DEFAULT_DATE_FIELD.to_string(),
        }
    }
}

fn owned<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

impl QueryConfig {
    #[must_use]
    pub fn new(default_sort: impl Into<String>) -> Self {
        Self {
            default_sort: default_sort.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limits(mut self, default_limit: u64, max_limit: u64) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    #[must_use]
    pub fn with_sort_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sort_fields = owned(fields);
        self
    }

    #[must_use]
    pub fn with_filter_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_filter_fields = owned(fields);
        self
    }

    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = owned(fields);
        self
    }

    #[must_use]
    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = field.into();
        self
    }

    /// Effective upper bound for `limit`, never below 1.
    #[must_use]
    pub fn effective_max_limit(&self) -> u64 {
        self.max_limit.max(1)
    }

    /// `default_limit` clamped into `[1, effective_max_limit()]`.
    #[must_use]
    pub fn effective_default_limit(&self) -> u64 {
        self.default_limit.clamp(1, self.effective_max_limit())
    }

    #[must_use]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.allowed_sort_fields.iter().any(|allowed| allowed == field)
    }

    /// An empty filter whitelist admits every field.
    #[must_use]
    pub fn is_filterable(&self, field: &str) -> bool {
        self.allowed_filter_fields.is_empty()
            || self.allowed_filter_fields.iter().any(|allowed| allowed == field)
    }
}

/// Reserved query-string keys understood by listing endpoints.
///
/// This struct documents the query surface for OpenAPI. Requests are read
/// through [`RawParameters`](crate::RawParameters), because `filter[<field>]`
/// keys are open-ended.
///
/// # Filtering
/// `filter[<field>]=<v1>,<v2>` keeps records whose field equals one of the
/// comma-separated values, for example `filter[status]=active,inactive`.
/// Fields outside the route's whitelist are ignored.
///
/// # Sorting
/// `sort=<field>` sorts ascending, `sort=-<field>` descending.
///
/// # Pagination
/// `page` is 1-based, `limit` is clamped to the route's maximum.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Sort field, prefixed with `-` for descending order.
    #[param(example = "-createdAt")]
    pub sort: Option<String>,
    /// Case-insensitive text matched against the route's search fields.
    #[param(example = "rose")]
    pub search: Option<String>,
    /// 1-based page number.
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Page size.
    #[param(example = 10)]
    pub limit: Option<u64>,
    /// Inclusive lower bound on the route's date field (`YYYY-MM-DD` or RFC 3339).
    #[param(example = "2024-01-01")]
    pub date_from: Option<String>,
    /// Inclusive upper bound on the route's date field (`YYYY-MM-DD` or RFC 3339).
    #[param(example = "2024-12-31")]
    pub date_to: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// A resolved sort: one field and a direction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Response envelope of a listing query: `{ data, total, page, limit, totalPages }`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<R> {
    pub data: Vec<R>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<R> QueryResult<R> {
    #[must_use]
    pub fn new(data: Vec<R>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: crate::filtering::pagination::total_pages(total, limit),
        }
    }

    /// An envelope with no records, for callers that short-circuit a query.
    #[must_use]
    pub fn empty(page: u64, limit: u64) -> Self {
        Self::new(Vec::new(), 0, page, limit)
    }

    /// Transform every record while keeping the pagination metadata.
    pub fn map<T, F>(self, f: F) -> QueryResult<T>
    where
        F: FnMut(R) -> T,
    {
        QueryResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
