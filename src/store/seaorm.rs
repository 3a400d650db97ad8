use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ColumnType, Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DbErr, EntityTrait, IdenStatic, Iterable, PaginatorTrait, PrimaryKeyToColumn, QueryFilter,
    QueryOrder, QuerySelect, Value as DbValue,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};
use serde_json::Value;

use super::CollectionStore;
use crate::expression::QueryExpression;
use crate::filtering::pagination::MAX_OFFSET;
use crate::filtering::search::escape_like_wildcards;
use crate::models::SortSpec;

/// Collection backed by a Sea-ORM entity.
///
/// Records are returned as JSON objects keyed by column name.
pub struct SeaOrmStore<E> {
    db: DatabaseConnection,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SeaOrmStore<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> SeaOrmStore<E> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Find the entity column for a field name: whatever the entity's column
/// parser accepts, then the exact column name.
fn column<E: EntityTrait>(field: &str) -> Option<E::Column> {
    field
        .parse::<E::Column>()
        .ok()
        .or_else(|| E::Column::iter().find(|col| col.as_str() == field))
}

/// A condition no row satisfies.
fn never() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

/// Convert a query-string value to the column's type. `None` when the value
/// cannot be represented, e.g. `abc` for an integer column.
fn typed_value(column_type: &ColumnType, raw: &str) -> Option<DbValue> {
    match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => raw.parse::<i64>().ok().map(DbValue::from),
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => {
            raw.parse::<f64>().ok().map(DbValue::from)
        }
        ColumnType::Boolean => raw.parse::<bool>().ok().map(DbValue::from),
        _ => Some(DbValue::from(raw.to_string())),
    }
}

fn equals_condition<C: ColumnTrait>(col: C, raw: &str) -> Condition {
    typed_value(col.def().get_column_type(), raw).map_or_else(never, |value| {
        Condition::all().add(ColumnTrait::eq(&col, value))
    })
}

fn in_condition<C: ColumnTrait>(col: C, raw_values: &[String]) -> Condition {
    let column_type = col.def().get_column_type().clone();
    let values: Vec<DbValue> = raw_values
        .iter()
        .filter_map(|raw| typed_value(&column_type, raw))
        .collect();

    if values.is_empty() {
        never()
    } else {
        Condition::all().add(col.is_in(values))
    }
}

fn like(target: SimpleExpr, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like_wildcards(term));
    Expr::expr(target).like(LikeExpr::new(pattern).escape('\\'))
}

/// `UPPER(column) LIKE '%TERM%' ESCAPE '\'` with the term's wildcards escaped.
///
/// SQLite's `UPPER` and `LIKE` fold ASCII letters only, so there the raw
/// term and its lowercase form are matched as well. Non-ASCII letters then
/// match when they already agree in case or the column holds them in
/// lowercase.
fn contains_condition<E: EntityTrait>(
    col: E::Column,
    term: &str,
    backend: DatabaseBackend,
) -> Condition {
    let target: SimpleExpr = match col.def().get_column_type() {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => {
            Expr::col((E::default(), col)).into()
        }
        // Enums need a cast before string functions apply on Postgres
        ColumnType::Enum { .. } => Expr::col((E::default(), col)).cast_as(Alias::new("TEXT")),
        _ => return never(),
    };

    let mut condition = Condition::any().add(like(
        Func::upper(target.clone()).into(),
        &term.to_uppercase(),
    ));

    if backend == DatabaseBackend::Sqlite {
        let lowercase = term.to_lowercase();
        condition = condition.add(like(target.clone(), term));
        if lowercase != term {
            condition = condition.add(like(target, &lowercase));
        }
    }
    condition
}

fn range_condition<C: ColumnTrait>(
    col: C,
    from: Option<chrono::DateTime<chrono::Utc>>,
    to: Option<chrono::DateTime<chrono::Utc>>,
) -> Condition {
    let mut condition = Condition::all();
    if let Some(from) = from {
        condition = condition.add(col.gte(from));
    }
    if let Some(to) = to {
        condition = condition.add(col.lte(to));
    }
    condition
}

/// Translate an expression into a Sea-ORM condition on entity `E` for the
/// given backend.
///
/// Predicates on fields that are not columns of `E` match nothing.
#[must_use]
pub fn to_condition<E: EntityTrait>(
    expression: &QueryExpression,
    backend: DatabaseBackend,
) -> Condition {
    let recurse = |e: &QueryExpression| to_condition::<E>(e, backend);
    match expression {
        QueryExpression::MatchAll => Condition::all(),
        QueryExpression::And { all } => all
            .iter()
            .fold(Condition::all(), |acc, e| acc.add(recurse(e))),
        QueryExpression::Or { any } if any.is_empty() => never(),
        QueryExpression::Or { any } => any
            .iter()
            .fold(Condition::any(), |acc, e| acc.add(recurse(e))),
        QueryExpression::Equals { field, value } => {
            column::<E>(field).map_or_else(never, |col| equals_condition(col, value))
        }
        QueryExpression::In { field, values } => {
            column::<E>(field).map_or_else(never, |col| in_condition(col, values))
        }
        QueryExpression::Contains { field, term } => column::<E>(field)
            .map_or_else(never, |col| contains_condition::<E>(col, term, backend)),
        QueryExpression::Range { field, from, to } => {
            column::<E>(field).map_or_else(never, |col| range_condition(col, *from, *to))
        }
    }
}

#[async_trait]
impl<E> CollectionStore for SeaOrmStore<E>
where
    E: EntityTrait + 'static,
    E::Model: Sync,
{
    type Record = Value;

    async fn count(&self, expression: &QueryExpression) -> Result<u64, DbErr> {
        E::find()
            .filter(to_condition::<E>(expression, self.db.get_database_backend()))
            .count(&self.db)
            .await
    }

    async fn find(
        &self,
        expression: &QueryExpression,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>, DbErr> {
        // Drivers bind OFFSET and LIMIT as i64
        if skip > MAX_OFFSET {
            return Ok(Vec::new());
        }
        let limit = limit.min(MAX_OFFSET);

        let mut query =
            E::find().filter(to_condition::<E>(expression, self.db.get_database_backend()));

        if let Some(col) = column::<E>(&sort.field) {
            query = query.order_by(col, sort.direction.into());
        } else {
            tracing::debug!(field = %sort.field, "Sort field is not a column, ordering by key only");
        }

        // Primary key as tie-breaker so pages never overlap
        for key in E::PrimaryKey::iter() {
            query = query.order_by_asc(key.into_column());
        }

        query
            .offset(skip)
            .limit(limit)
            .into_json()
            .all(&self.db)
            .await
    }
}
