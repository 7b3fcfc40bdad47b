//! Listing-engine tests against an in-memory store.
//!
//! Exercises the same predicate/paginate/summarize path the Postgres store
//! uses, with a small vector-backed store so the engine's contracts can be
//! checked without a database:
//! - page length and `pages` arithmetic, including pages past the end
//! - soft-delete exclusion from records, totals, and summaries
//! - literal (escaped) search matching
//! - summary computed over the full filtered set, not the fetched page
//! - store failures surfacing unchanged

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use estato_core::query::{
    paginate, summarize, Condition, FilterBuilder, GroupRow, GroupSpec, ListConfig, Predicate,
    QueryError, Scalar, Sort, SortOrder, Store, StoreError,
};
use estato_core::types::Timestamp;

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    id: i64,
    name: String,
    status: String,
    amount: f64,
    created_at: Timestamp,
    deleted_at: Option<Timestamp>,
}

impl Row {
    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::Int(self.id)),
            "name" => Some(Scalar::Text(self.name.clone())),
            "status" => Some(Scalar::Text(self.status.clone())),
            "amount" => Some(Scalar::Float(self.amount)),
            "created_at" => Some(Scalar::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

struct MemStore {
    rows: Vec<Row>,
}

fn cmp_scalar(a: &Scalar, b: &Scalar) -> Option<Ordering> {
    match (a, b) {
        (Scalar::Int(x), Scalar::Int(y)) => Some(x.cmp(y)),
        (Scalar::Float(x), Scalar::Float(y)) => x.partial_cmp(y),
        (Scalar::Bool(x), Scalar::Bool(y)) => Some(x.cmp(y)),
        (Scalar::Text(x), Scalar::Text(y)) => Some(x.cmp(y)),
        (Scalar::Timestamp(x), Scalar::Timestamp(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Inverse of the engine's LIKE escaping: a backslash makes the next
/// character literal.
fn unescape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn row_matches(row: &Row, predicate: &Predicate) -> bool {
    predicate.conditions.iter().all(|condition| match condition {
        Condition::NotDeleted => row.deleted_at.is_none(),
        Condition::Eq { field, value } => row.field(field).as_ref() == Some(value),
        Condition::InSet { field, values } => {
            row.field(field).is_some_and(|v| values.contains(&v))
        }
        Condition::Range { field, min, max } => {
            let Some(value) = row.field(field) else {
                return false;
            };
            let above_min = min.as_ref().map_or(true, |m| {
                cmp_scalar(&value, m).is_some_and(|o| o != Ordering::Less)
            });
            let below_max = max.as_ref().map_or(true, |m| {
                cmp_scalar(&value, m).is_some_and(|o| o != Ordering::Greater)
            });
            above_min && below_max
        }
        Condition::Search { fields, term } => {
            let needle = unescape(term).to_lowercase();
            fields.iter().any(|f| match row.field(f) {
                Some(Scalar::Text(text)) => text.to_lowercase().contains(&needle),
                _ => false,
            })
        }
    })
}

fn numeric(value: Option<Scalar>) -> f64 {
    match value {
        Some(Scalar::Float(f)) => f,
        Some(Scalar::Int(i)) => i as f64,
        _ => 0.0,
    }
}

#[async_trait]
impl Store for MemStore {
    type Record = Row;

    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| row_matches(r, predicate))
            .count() as i64)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Row>, StoreError> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|r| row_matches(r, predicate))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ordering = match (a.field(sort.field), b.field(sort.field)) {
                (Some(x), Some(y)) => cmp_scalar(&x, &y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(rows
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn aggregate(
        &self,
        predicate: &Predicate,
        spec: &GroupSpec,
    ) -> Result<Vec<GroupRow>, StoreError> {
        let mut groups: BTreeMap<Option<String>, Vec<&Row>> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| row_matches(r, predicate)) {
            let key = match row.field(spec.group_by) {
                Some(Scalar::Text(text)) => Some(text),
                _ => None,
            };
            groups.entry(key).or_default().push(row);
        }
        Ok(groups
            .into_iter()
            .map(|(key, rows)| {
                let count = rows.len() as i64;
                let sums = spec
                    .sum_fields
                    .iter()
                    .map(|f| rows.iter().map(|r| numeric(r.field(f))).sum())
                    .collect();
                let avgs = spec
                    .avg_fields
                    .iter()
                    .map(|f| {
                        rows.iter().map(|r| numeric(r.field(f))).sum::<f64>() / count as f64
                    })
                    .collect();
                GroupRow {
                    key,
                    count,
                    sums,
                    avgs,
                }
            })
            .collect())
    }
}

/// A store whose every read fails, for error-propagation tests.
struct BrokenStore;

fn broken() -> StoreError {
    StoreError::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "store unreachable",
    ))
}

#[async_trait]
impl Store for BrokenStore {
    type Record = Row;

    async fn count(&self, _predicate: &Predicate) -> Result<i64, StoreError> {
        Err(broken())
    }

    async fn find(
        &self,
        _predicate: &Predicate,
        _sort: &Sort,
        _skip: i64,
        _limit: i64,
    ) -> Result<Vec<Row>, StoreError> {
        Err(broken())
    }

    async fn aggregate(
        &self,
        _predicate: &Predicate,
        _spec: &GroupSpec,
    ) -> Result<Vec<GroupRow>, StoreError> {
        Err(broken())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const CONFIG: ListConfig = ListConfig {
    searchable_fields: &["name"],
    sortable_fields: &["name", "created_at", "amount"],
    default_sort: Sort {
        field: "created_at",
        order: SortOrder::Asc,
    },
    default_limit: 10,
};

const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &["amount"],
    avg_fields: &[],
};

/// 25 live rows (ids 1-25) plus 3 soft-deleted ones (ids 26-28).
/// Statuses cycle pending/paid/waived; amounts are `id * 100`.
fn fixture() -> MemStore {
    let base = Utc::now() - Duration::days(100);
    let mut rows = Vec::new();
    for id in 1..=28i64 {
        let status = match id % 3 {
            0 => "waived",
            1 => "pending",
            _ => "paid",
        };
        rows.push(Row {
            id,
            name: format!("record {id:02}"),
            status: status.to_string(),
            amount: id as f64 * 100.0,
            created_at: base + Duration::days(id),
            deleted_at: (id > 25).then(|| base + Duration::days(90)),
        });
    }
    MemStore { rows }
}

fn default_sort() -> Sort {
    CONFIG.resolve_sort(None, None)
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn third_page_of_25_records_holds_the_remainder() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), 3, 10)
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(meta.total, 25);
    assert_eq!(meta.pages, 3);
    assert_eq!(meta.page, 3);
    assert_eq!(meta.limit, 10);
}

#[tokio::test]
async fn page_length_matches_the_slice_formula() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    for page in 1..=5i64 {
        let (records, meta) = paginate(&store, &predicate, &default_sort(), page, 10)
            .await
            .unwrap();
        let expected = (meta.total - (page - 1) * 10).clamp(0, 10);
        assert_eq!(records.len() as i64, expected, "page {page}");
    }
}

#[tokio::test]
async fn page_past_the_end_is_empty_not_an_error() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), 99, 10)
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(meta.total, 25);
    assert_eq!(meta.pages, 3);
}

#[tokio::test]
async fn out_of_range_page_and_limit_are_clamped() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), -5, 1_000)
        .await
        .unwrap();

    assert_eq!(meta.page, 1);
    assert_eq!(meta.limit, 100);
    assert_eq!(records.len(), 25);
}

#[tokio::test]
async fn repeated_calls_are_idempotent_on_an_unchanged_store() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();
    let sort = CONFIG.resolve_sort(Some("amount"), None);

    let (first, first_meta) = paginate(&store, &predicate, &sort, 2, 7).await.unwrap();
    let (second, second_meta) = paginate(&store, &predicate, &sort, 2, 7).await.unwrap();

    assert_eq!(first_meta, second_meta);
    assert_eq!(
        first.iter().map(|r| r.id).collect::<Vec<_>>(),
        second.iter().map(|r| r.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn records_follow_the_requested_sort() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();
    let sort = CONFIG.resolve_sort(Some("amount"), Some(SortOrder::Desc));

    let (records, _) = paginate(&store, &predicate, &sort, 1, 3).await.unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![25, 24, 23]);
}

#[tokio::test]
async fn unknown_sort_field_uses_the_default_without_erroring() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();
    let sort = CONFIG.resolve_sort(Some("no_such_field"), None);

    let (records, _) = paginate(&store, &predicate, &sort, 1, 3).await.unwrap();
    // Default sort is created_at ascending, i.e. insertion order here.
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Soft-delete exclusion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn soft_deleted_rows_never_reach_records_totals_or_summary() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), 1, 100)
        .await
        .unwrap();
    assert_eq!(meta.total, 25);
    assert!(records.iter().all(|r| r.deleted_at.is_none()));

    let rows = summarize(&store, &predicate, &BY_STATUS).await.unwrap();
    let total: i64 = rows.iter().map(|r| r.count).sum();
    assert_eq!(total, 25);
}

#[tokio::test]
async fn include_deleted_opts_back_in() {
    let store = fixture();
    let mut builder = FilterBuilder::new();
    builder.include_deleted();
    let predicate = builder.build();

    let (_, meta) = paginate(&store, &predicate, &default_sort(), 1, 10)
        .await
        .unwrap();
    assert_eq!(meta.total, 28);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_with_no_matches_yields_an_empty_page_and_summary() {
    let store = fixture();
    let mut builder = FilterBuilder::new();
    builder.search(&CONFIG, Some("zzz-no-such-record"));
    let predicate = builder.build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), 1, 10)
        .await
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(meta.total, 0);
    assert_eq!(meta.pages, 0);

    let rows = summarize(&store, &predicate, &BY_STATUS).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn search_metacharacters_match_literally() {
    let base = Utc::now();
    let store = MemStore {
        rows: vec![
            Row {
                id: 1,
                name: "phase 100%_done".to_string(),
                status: "paid".to_string(),
                amount: 10.0,
                created_at: base,
                deleted_at: None,
            },
            Row {
                id: 2,
                name: "phase 100 done".to_string(),
                status: "paid".to_string(),
                amount: 10.0,
                created_at: base,
                deleted_at: None,
            },
        ],
    };

    let mut builder = FilterBuilder::new();
    builder.search(&CONFIG, Some("100%_"));
    let predicate = builder.build();

    let (records, meta) = paginate(&store, &predicate, &default_sort(), 1, 10)
        .await
        .unwrap();
    assert_eq!(meta.total, 1);
    assert_eq!(records[0].id, 1);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_set_and_range_filters_compose() {
    let store = fixture();
    let mut builder = FilterBuilder::new();
    builder.one_of("status", &["pending", "paid"]);
    builder.amount_range("amount", Some(500.0), Some(1_200.0));
    let predicate = builder.build();

    let (records, _) = paginate(&store, &predicate, &default_sort(), 1, 100)
        .await
        .unwrap();
    assert!(records
        .iter()
        .all(|r| r.status != "waived" && r.amount >= 500.0 && r.amount <= 1_200.0));
    // ids 5..=12 minus waived ids 6, 9, 12.
    assert_eq!(records.len(), 5);
}

#[test]
fn malformed_reference_id_fails_before_any_store_access() {
    let mut builder = FilterBuilder::new();
    let err = builder
        .reference("plot_id", Some("not-an-id"))
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_covers_the_full_filtered_set_not_the_page() {
    let store = fixture();
    let predicate = FilterBuilder::new().build();

    // Fetch a tiny page; the summary must still see all 25 live rows.
    let (records, meta) = paginate(&store, &predicate, &default_sort(), 1, 2)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let rows = summarize(&store, &predicate, &BY_STATUS).await.unwrap();
    let group_total: i64 = rows.iter().map(|r| r.count).sum();
    assert_eq!(group_total, meta.total);

    // 25 live rows cycle pending/paid/waived starting at pending.
    let by_key: std::collections::BTreeMap<_, _> = rows
        .iter()
        .map(|r| (r.key.clone().unwrap(), r.count))
        .collect();
    assert_eq!(by_key["pending"], 9);
    assert_eq!(by_key["paid"], 8);
    assert_eq!(by_key["waived"], 8);
}

#[tokio::test]
async fn summary_sums_follow_the_filter() {
    let store = fixture();
    let mut builder = FilterBuilder::new();
    builder.one_of("status", &["pending"]);
    let predicate = builder.build();

    let rows = summarize(&store, &predicate, &BY_STATUS).await.unwrap();
    assert_eq!(rows.len(), 1);
    // pending ids: 1,4,...,25 -> sum of id*100.
    let expected: f64 = (1..=25)
        .filter(|id| id % 3 == 1)
        .map(|id| id as f64 * 100.0)
        .sum();
    assert_eq!(rows[0].sums[0], expected);
}

// ---------------------------------------------------------------------------
// Store failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failures_surface_as_dependency_errors() {
    let predicate = FilterBuilder::new().build();

    let err = paginate(&BrokenStore, &predicate, &default_sort(), 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Dependency(_)));

    let err = summarize(&BrokenStore, &predicate, &BY_STATUS)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Dependency(_)));
}
