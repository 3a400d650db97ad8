use serde::{Deserialize, Serialize};

use super::query_parser::RawParameters;
use crate::models::QueryConfig;

// Basic safety limits
const MAX_FIELD_NAME_LENGTH: usize = 100;
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

const FILTER_PREFIX: &str = "filter[";
const FILTER_SUFFIX: &str = "]";

/// One whitelisted filter: the field must hold one of `values`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterPredicate {
    pub field: String,
    /// Candidate values, de-duplicated, in first-seen order. Never empty.
    pub values: Vec<String>,
}

/// Field names must be plain identifiers so they can never smuggle store
/// operators (`$where`), nested paths or bracket syntax into a query.
#[must_use]
pub fn is_valid_field_name(field_name: &str) -> bool {
    !field_name.is_empty()
        && field_name.len() <= MAX_FIELD_NAME_LENGTH
        && !field_name.starts_with('.')
        && !field_name.contains("..")
        && !field_name.contains(['$', '[', ']'])
}

const fn validate_field_value(value: &str) -> bool {
    value.len() <= MAX_FIELD_VALUE_LENGTH
}

/// Extract `<field>` from a `filter[<field>]` key.
fn filter_field(key: &str) -> Option<&str> {
    key.strip_prefix(FILTER_PREFIX)?.strip_suffix(FILTER_SUFFIX)
}

fn push_values(target: &mut Vec<String>, raw_value: &str) {
    for piece in raw_value.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() || !validate_field_value(trimmed) {
            continue;
        }
        if !target.iter().any(|existing| existing == trimmed) {
            target.push(trimmed.to_string());
        }
    }
}

/// Collect the `filter[<field>]` parameters a route allows.
///
/// Unknown or malformed fields are dropped without an error. Repeated keys
/// for one field merge into a single value set, and predicates keep the
/// order in which their fields first appeared.
#[must_use]
pub fn parse_filters(raw: &RawParameters, config: &QueryConfig) -> Vec<FilterPredicate> {
    let mut predicates: Vec<FilterPredicate> = Vec::new();

    for (key, value) in raw.iter() {
        let Some(field) = filter_field(key) else {
            continue;
        };

        if !is_valid_field_name(field) || !config.is_filterable(field) {
            tracing::debug!(field = %field, "Ignoring filter on field outside whitelist");
            continue;
        }

        if let Some(existing) = predicates.iter_mut().find(|p| p.field == field) {
            push_values(&mut existing.values, value);
        } else {
            let mut values = Vec::new();
            push_values(&mut values, value);
            predicates.push(FilterPredicate {
                field: field.to_string(),
                values,
            });
        }
    }

    predicates.retain(|predicate| !predicate.values.is_empty());
    predicates
}
