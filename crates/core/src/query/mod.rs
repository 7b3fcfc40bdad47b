//! Generic listing engine used by every paginated endpoint.
//!
//! A module describes its listable surface once (searchable fields, sort
//! allow-list, defaults), handlers translate raw query parameters into a
//! [`Predicate`] via [`FilterBuilder`], and the engine asks a [`Store`] for
//! the matching page, the total count, and grouped summary aggregates. The
//! summary is always computed over the full filtered set, never the
//! fetched page. Soft-deleted rows are excluded unless a builder opts in.

pub mod filter;
pub mod page;
pub mod params;
pub mod store;
pub mod summary;

pub use filter::{escape_like, parse_ref_id, Condition, FilterBuilder, Predicate, Scalar};
pub use page::{Page, PageMeta};
pub use params::{clamp_limit, clamp_page, ListConfig, ListParams, Sort, SortOrder, MAX_PAGE_SIZE};
pub use store::{paginate, summarize, Store, StoreError};
pub use summary::{avg_across, counts_by_key, ratio, sum_across, total_count, GroupRow, GroupSpec};

/// Errors surfaced by the listing engine.
///
/// Malformed reference ids are rejected before any query executes; store
/// failures propagate unchanged. Unknown sort fields are not errors (they
/// fall back to the module default).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Dependency(#[from] StoreError),
}
