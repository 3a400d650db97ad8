//! # Query Expressions
//!
//! A listing query is represented as a small tree that does not depend on
//! any particular store. [`compose`] builds it from a [`ParsedQuery`], and
//! each [`CollectionStore`](crate::CollectionStore) adapter translates it to
//! its own query language.
//!
//! ```rust
//! use querycrate::{QueryConfig, QueryExpression, RawParameters, compose, parse};
//!
//! let config = QueryConfig::new("createdAt").with_filter_fields(["status"]);
//! let raw = RawParameters::from_query_str("filter[status]=active,inactive");
//! let expression = compose(&parse(&raw, &config));
//!
//! assert_eq!(
//!     expression,
//!     QueryExpression::In {
//!         field: "status".into(),
//!         values: vec!["active".into(), "inactive".into()],
//!     }
//! );
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filtering::conditions::FilterPredicate;
use crate::filtering::date_range::DateRange;
use crate::filtering::query_parser::ParsedQuery;
use crate::filtering::search::SearchPredicate;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryExpression {
    /// Matches every record.
    MatchAll,
    And { all: Vec<QueryExpression> },
    Or { any: Vec<QueryExpression> },
    Equals { field: String, value: String },
    In { field: String, values: Vec<String> },
    /// Case-insensitive substring match on a string field.
    Contains { field: String, term: String },
    /// Inclusive bounds on a timestamp field.
    Range {
        field: String,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

impl QueryExpression {
    /// Conjunction of `expressions`. No operands yields `MatchAll`, a single
    /// operand is returned as is.
    #[must_use]
    pub fn all(mut expressions: Vec<Self>) -> Self {
        match expressions.len() {
            0 => Self::MatchAll,
            1 => expressions.remove(0),
            _ => Self::And { all: expressions },
        }
    }

    /// Disjunction of `expressions`. A single operand is returned as is.
    /// No operands matches nothing.
    #[must_use]
    pub fn any(mut expressions: Vec<Self>) -> Self {
        match expressions.len() {
            1 => expressions.remove(0),
            _ => Self::Or { any: expressions },
        }
    }

    #[must_use]
    pub const fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    /// Evaluate against a JSON record.
    ///
    /// Missing fields never satisfy a predicate. Scalars compare by their
    /// string form, so `{"age": 3}` equals `"3"`.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::MatchAll => true,
            Self::And { all } => all.iter().all(|e| e.matches(record)),
            Self::Or { any } => any.iter().any(|e| e.matches(record)),
            Self::Equals { field, value } => {
                scalar_text(record.get(field)).is_some_and(|text| text == *value)
            }
            Self::In { field, values } => scalar_text(record.get(field))
                .is_some_and(|text| values.iter().any(|value| *value == text)),
            Self::Contains { field, term } => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&term.to_lowercase())),
            Self::Range { field, from, to } => {
                timestamp(record.get(field)).is_some_and(|at| {
                    from.is_none_or(|from| at >= from) && to.is_none_or(|to| at <= to)
                })
            }
        }
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value?
        .as_str()
        .and_then(crate::filtering::date_range::parse_date)
}

/// Total order over JSON values used for in-memory sorting: missing and
/// null first, then booleans, numbers, strings, arrays, objects.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn filter_expression(predicate: &FilterPredicate) -> QueryExpression {
    match predicate.values.as_slice() {
        [single] => QueryExpression::Equals {
            field: predicate.field.clone(),
            value: single.clone(),
        },
        values => QueryExpression::In {
            field: predicate.field.clone(),
            values: values.to_vec(),
        },
    }
}

fn search_expression(search: &SearchPredicate) -> QueryExpression {
    QueryExpression::any(
        search
            .fields
            .iter()
            .map(|field| QueryExpression::Contains {
                field: field.clone(),
                term: search.term.clone(),
            })
            .collect(),
    )
}

fn date_expression(range: &DateRange) -> QueryExpression {
    QueryExpression::Range {
        field: range.field.clone(),
        from: range.from,
        to: range.to,
    }
}

/// Combine every predicate of a parsed query with logical AND.
///
/// Operands appear in a fixed order: filters as they appeared in the
/// request, then search, then the date range.
#[must_use]
pub fn compose(parsed: &ParsedQuery) -> QueryExpression {
    let mut predicates: Vec<QueryExpression> =
        parsed.filters.iter().map(filter_expression).collect();

    if let Some(search) = &parsed.search {
        predicates.push(search_expression(search));
    }
    if let Some(range) = &parsed.date_range {
        predicates.push(date_expression(range));
    }

    QueryExpression::all(predicates)
}
