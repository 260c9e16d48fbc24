//! PostgreSQL rendering of a [`ListQuery`]
//!
//! Identifiers (table, columns, sort keys) only ever come from `&'static str`
//! allow-lists; every user-derived value goes through `push_bind`.

use std::marker::PhantomData;

use kernel::error::app_error::AppResult;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::definition::ListQuery;
use crate::executor::ListSource;
use crate::filter::{Condition, FilterValue};

/// Table and projection a list reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTable {
    pub name: &'static str,
    /// Comma-separated select list
    pub columns: &'static str,
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(text) => builder.push_bind(text.clone()),
        FilterValue::Integer(n) => builder.push_bind(*n),
        FilterValue::Timestamp(ts) => builder.push_bind(*ts),
        FilterValue::Uuid(id) => builder.push_bind(*id),
    };
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, query: &ListQuery) {
    builder.push(" WHERE TRUE");

    for condition in query.filter().conditions() {
        match condition {
            Condition::Eq { column, value } => {
                builder.push(" AND ").push(*column).push(" = ");
                push_value(builder, value);
            }
            Condition::Range { column, gte, lte } => {
                if let Some(lower) = gte {
                    builder.push(" AND ").push(*column).push(" >= ");
                    push_value(builder, lower);
                }
                if let Some(upper) = lte {
                    builder.push(" AND ").push(*column).push(" <= ");
                    push_value(builder, upper);
                }
            }
        }
    }

    if let Some((token, targets)) = query.search() {
        let pattern = token.like_pattern();
        let mut separated = builder.separated(" OR ");
        separated.push_unseparated(" AND (");
        for column in targets.text_columns {
            separated.push(*column);
            separated.push_unseparated(" ILIKE ");
            separated.push_bind_unseparated(pattern.clone());
            separated.push_unseparated(" ESCAPE '\\'");
        }
        if let (Some(column), Some(number)) = (targets.numeric_column, token.number()) {
            separated.push(column);
            separated.push_unseparated(" = ");
            separated.push_bind_unseparated(number);
        }
        separated.push_unseparated(")");
    }
}

/// `SELECT <columns> FROM <table> WHERE ... ORDER BY ... LIMIT $ OFFSET $`
pub fn page_query(table: &SqlTable, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", table.columns, table.name));
    push_where(&mut builder, query);

    let sort = query.sort();
    let direction = sort.direction.as_sql();
    builder
        .push(" ORDER BY ")
        .push(sort.column)
        .push(" ")
        .push(direction);
    if query.tiebreaker() != sort.column {
        builder
            .push(", ")
            .push(query.tiebreaker())
            .push(" ")
            .push(direction);
    }

    let page = query.page();
    builder.push(" LIMIT ");
    builder.push_bind(i64::from(page.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    builder
}

/// `SELECT COUNT(*) FROM <table> WHERE ...` with the same filter and search
pub fn count_query(table: &SqlTable, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table.name));
    push_where(&mut builder, query);
    builder
}

/// [`ListSource`] reading rows of type `R` from one table
pub struct PgListSource<R> {
    pool: PgPool,
    table: SqlTable,
    _row: PhantomData<fn() -> R>,
}

impl<R> PgListSource<R> {
    pub fn new(pool: PgPool, table: SqlTable) -> Self {
        Self {
            pool,
            table,
            _row: PhantomData,
        }
    }
}

impl<R> ListSource<R> for PgListSource<R>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    async fn fetch_page(&self, query: &ListQuery) -> AppResult<Vec<R>> {
        let mut builder = page_query(&self.table, query);
        tracing::debug!(sql = builder.sql(), "List page query");
        let rows = builder
            .build_query_as::<R>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self, query: &ListQuery) -> AppResult<u64> {
        let mut builder = count_query(&self.table, query);
        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}
