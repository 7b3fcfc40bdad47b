//! Page metadata and the listing result envelope.

use serde::Serialize;

/// Describes a paginated slice: `{page, limit, total, pages}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageMeta {
    /// `page` and `limit` must already be clamped to their valid ranges.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }

    /// Offset of the first record on a page.
    pub fn offset(page: i64, limit: i64) -> i64 {
        (page - 1) * limit
    }
}

/// One page of records plus pagination metadata and an optional summary
/// computed over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T, S = ()> {
    pub records: Vec<T>,
    pub pagination: PageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<S>,
}

impl<T, S> Page<T, S> {
    pub fn new(records: Vec<T>, pagination: PageMeta) -> Self {
        Self {
            records,
            pagination,
            summary: None,
        }
    }

    pub fn with_summary(records: Vec<T>, pagination: PageMeta, summary: S) -> Self {
        Self {
            records,
            pagination,
            summary: Some(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(PageMeta::new(1, 10, 25).pages, 3);
        assert_eq!(PageMeta::new(1, 10, 30).pages, 3);
        assert_eq!(PageMeta::new(1, 10, 31).pages, 4);
        assert_eq!(PageMeta::new(1, 1, 7).pages, 7);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total, 0);
        assert_eq!(meta.pages, 0);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageMeta::offset(1, 10), 0);
        assert_eq!(PageMeta::offset(3, 10), 20);
    }
}
