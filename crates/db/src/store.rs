//! Postgres implementation of the core `Store` abstraction.
//!
//! A [`Predicate`] compiles to a WHERE clause with numbered parameters
//! plus the scalar values to bind, in order. Field names in predicates,
//! sorts, and group specs come from each module's static configuration,
//! never from user input, so identifier interpolation is safe here.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Row};

use estato_core::query::{
    Condition, GroupRow, GroupSpec, Predicate, Scalar, Sort, SortOrder, Store, StoreError,
};

/// A table-backed store for one entity type.
pub struct PgStore<'a, T> {
    pool: &'a PgPool,
    table: &'static str,
    columns: &'static str,
    _record: PhantomData<T>,
}

impl<'a, T> PgStore<'a, T> {
    pub fn new(pool: &'a PgPool, table: &'static str, columns: &'static str) -> Self {
        Self {
            pool,
            table,
            columns,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Store for PgStore<'_, T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Sync,
{
    type Record = T;

    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        let (where_clause, binds) = compile(predicate);
        let sql = format!(
            "SELECT COUNT(*)::BIGINT FROM {} {where_clause}",
            self.table
        );
        bind_scalar_values(sqlx::query_scalar::<_, i64>(&sql), &binds)
            .fetch_one(self.pool)
            .await
            .map_err(StoreError::new)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<T>, StoreError> {
        let (where_clause, binds) = compile(predicate);
        let sql = format!(
            "SELECT {} FROM {} {where_clause} ORDER BY {} {} LIMIT ${} OFFSET ${}",
            self.columns,
            self.table,
            sort.field,
            order_sql(sort.order),
            binds.len() + 1,
            binds.len() + 2,
        );
        bind_values(sqlx::query_as::<_, T>(&sql), &binds)
            .bind(limit)
            .bind(skip)
            .fetch_all(self.pool)
            .await
            .map_err(StoreError::new)
    }

    async fn aggregate(
        &self,
        predicate: &Predicate,
        spec: &GroupSpec,
    ) -> Result<Vec<GroupRow>, StoreError> {
        let (where_clause, binds) = compile(predicate);

        let mut select = vec![
            format!("{}::TEXT AS group_key", spec.group_by),
            "COUNT(*)::BIGINT AS group_count".to_string(),
        ];
        for (i, field) in spec.sum_fields.iter().enumerate() {
            select.push(format!("COALESCE(SUM({field}), 0)::FLOAT8 AS sum_{i}"));
        }
        for (i, field) in spec.avg_fields.iter().enumerate() {
            select.push(format!("COALESCE(AVG({field}), 0)::FLOAT8 AS avg_{i}"));
        }

        let sql = format!(
            "SELECT {} FROM {} {where_clause} GROUP BY {} ORDER BY group_key",
            select.join(", "),
            self.table,
            spec.group_by,
        );

        let rows = bind_query_values(sqlx::query(&sql), &binds)
            .fetch_all(self.pool)
            .await
            .map_err(StoreError::new)?;

        rows.into_iter()
            .map(|row| group_row_from(&row, spec))
            .collect()
    }
}

fn group_row_from(row: &PgRow, spec: &GroupSpec) -> Result<GroupRow, StoreError> {
    let key: Option<String> = row.try_get("group_key").map_err(StoreError::new)?;
    let count: i64 = row.try_get("group_count").map_err(StoreError::new)?;

    let mut sums = Vec::with_capacity(spec.sum_fields.len());
    for i in 0..spec.sum_fields.len() {
        sums.push(
            row.try_get::<f64, _>(format!("sum_{i}").as_str())
                .map_err(StoreError::new)?,
        );
    }
    let mut avgs = Vec::with_capacity(spec.avg_fields.len());
    for i in 0..spec.avg_fields.len() {
        avgs.push(
            row.try_get::<f64, _>(format!("avg_{i}").as_str())
                .map_err(StoreError::new)?,
        );
    }

    Ok(GroupRow {
        key,
        count,
        sums,
        avgs,
    })
}

fn order_sql(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Compile a predicate into `(where_clause, bind_values)`.
///
/// The clause is empty or starts with `WHERE `. Parameters are numbered in
/// the order the values appear in the returned vec. A search term binds
/// once and is reused across the OR-ed field comparisons.
fn compile(predicate: &Predicate) -> (String, Vec<Scalar>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut binds: Vec<Scalar> = Vec::new();

    for condition in &predicate.conditions {
        match condition {
            Condition::NotDeleted => clauses.push("deleted_at IS NULL".to_string()),
            Condition::Eq { field, value } => {
                binds.push(value.clone());
                clauses.push(format!("{field} = ${}", binds.len()));
            }
            Condition::InSet { field, values } => {
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    binds.push(value.clone());
                    placeholders.push(format!("${}", binds.len()));
                }
                clauses.push(format!("{field} IN ({})", placeholders.join(", ")));
            }
            Condition::Range { field, min, max } => {
                if let Some(min) = min {
                    binds.push(min.clone());
                    clauses.push(format!("{field} >= ${}", binds.len()));
                }
                if let Some(max) = max {
                    binds.push(max.clone());
                    clauses.push(format!("{field} <= ${}", binds.len()));
                }
            }
            Condition::Search { fields, term } => {
                binds.push(Scalar::Text(format!("%{term}%")));
                let n = binds.len();
                let ors: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{f} ILIKE ${n} ESCAPE '\\'"))
                    .collect();
                clauses.push(format!("({})", ors.join(" OR ")));
            }
        }
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    (where_clause, binds)
}

/// Bind compiled scalar values to a `QueryAs`.
fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    values: &'q [Scalar],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments> {
    for value in values {
        q = match value {
            Scalar::Int(v) => q.bind(*v),
            Scalar::Float(v) => q.bind(*v),
            Scalar::Bool(v) => q.bind(*v),
            Scalar::Text(v) => q.bind(v.as_str()),
            Scalar::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

/// Bind compiled scalar values to a `QueryScalar`.
fn bind_scalar_values<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments>,
    values: &'q [Scalar],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments> {
    for value in values {
        q = match value {
            Scalar::Int(v) => q.bind(*v),
            Scalar::Float(v) => q.bind(*v),
            Scalar::Bool(v) => q.bind(*v),
            Scalar::Text(v) => q.bind(v.as_str()),
            Scalar::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

/// Bind compiled scalar values to a plain `Query`.
fn bind_query_values<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    values: &'q [Scalar],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for value in values {
        q = match value {
            Scalar::Int(v) => q.bind(*v),
            Scalar::Float(v) => q.bind(*v),
            Scalar::Bool(v) => q.bind(*v),
            Scalar::Text(v) => q.bind(v.as_str()),
            Scalar::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use estato_core::query::FilterBuilder;

    #[test]
    fn empty_predicate_without_soft_delete_compiles_to_no_clause() {
        let mut builder = FilterBuilder::new();
        builder.include_deleted();
        let (clause, binds) = compile(&builder.build());
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn default_predicate_excludes_soft_deleted_rows() {
        let (clause, binds) = compile(&FilterBuilder::new().build());
        assert_eq!(clause, "WHERE deleted_at IS NULL");
        assert!(binds.is_empty());
    }

    #[test]
    fn conditions_number_their_parameters_in_order() {
        let mut builder = FilterBuilder::new();
        builder.reference("member_id", Some("7")).unwrap();
        builder.one_of("status", &["unpaid", "paid"]);
        builder.amount_range("amount", Some(100.0), None);
        let (clause, binds) = compile(&builder.build());

        assert_eq!(
            clause,
            "WHERE deleted_at IS NULL AND member_id = $1 \
             AND status IN ($2, $3) AND amount >= $4"
        );
        assert_eq!(binds.len(), 4);
        assert_eq!(binds[0], Scalar::Int(7));
        assert_eq!(binds[3], Scalar::Float(100.0));
    }

    #[test]
    fn search_binds_one_pattern_shared_across_fields() {
        let config = estato_core::query::ListConfig {
            searchable_fields: &["name", "cnic"],
            sortable_fields: &["created_at"],
            default_sort: Sort {
                field: "created_at",
                order: SortOrder::Desc,
            },
            default_limit: 20,
        };
        let mut builder = FilterBuilder::new();
        builder.search(&config, Some("khan"));
        let (clause, binds) = compile(&builder.build());

        assert_eq!(
            clause,
            "WHERE deleted_at IS NULL AND \
             (name ILIKE $1 ESCAPE '\\' OR cnic ILIKE $1 ESCAPE '\\')"
        );
        assert_eq!(binds, vec![Scalar::Text("%khan%".to_string())]);
    }
}
