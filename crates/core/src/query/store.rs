//! The store abstraction and the paginate/summarize entry points.

use async_trait::async_trait;

use super::filter::Predicate;
use super::page::PageMeta;
use super::params::{Sort, MAX_PAGE_SIZE};
use super::summary::{GroupRow, GroupSpec};
use super::QueryError;

/// Failure inside a store backend, carried unchanged. The engine never
/// retries or degrades on a store failure.
#[derive(Debug, thiserror::Error)]
#[error("Store failure: {0}")]
pub struct StoreError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

/// Read-only record store the listing engine runs against.
///
/// Implementations must evaluate a given predicate identically across
/// `count`, `find`, and `aggregate`; the engine issues them as independent
/// reads and may interleave them.
#[async_trait]
pub trait Store {
    type Record: Send;

    /// Number of records matching the predicate.
    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError>;

    /// Matching records ordered by `sort`, skipping `skip`, at most `limit`.
    /// Ties on the sort field keep the store's natural order; callers
    /// needing determinism must sort by a unique field.
    async fn find(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Self::Record>, StoreError>;

    /// Grouped aggregates over every record matching the predicate.
    async fn aggregate(
        &self,
        predicate: &Predicate,
        spec: &GroupSpec,
    ) -> Result<Vec<GroupRow>, StoreError>;
}

/// Fetch one page of records plus pagination metadata.
///
/// `page` and `limit` are clamped before use; a page past the end returns
/// an empty record list with correct metadata. The count and the page are
/// independent reads issued concurrently, so under concurrent writers
/// `total` may be stale relative to `records` -- acceptable for listings,
/// not for exact-count-dependent logic.
pub async fn paginate<S>(
    store: &S,
    predicate: &Predicate,
    sort: &Sort,
    page: i64,
    limit: i64,
) -> Result<(Vec<S::Record>, PageMeta), QueryError>
where
    S: Store + Sync,
{
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let skip = PageMeta::offset(page, limit);

    let (total, records) = futures::try_join!(
        store.count(predicate),
        store.find(predicate, sort, skip, limit)
    )?;

    Ok((records, PageMeta::new(page, limit, total)))
}

/// Grouped aggregates over the full filtered set, independent of paging.
pub async fn summarize<S>(
    store: &S,
    predicate: &Predicate,
    spec: &GroupSpec,
) -> Result<Vec<GroupRow>, QueryError>
where
    S: Store + Sync,
{
    Ok(store.aggregate(predicate, spec).await?)
}
