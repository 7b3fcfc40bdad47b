//! List request parameters and per-module listing configuration.

use serde::Serialize;

/// Upper bound on page size across all modules.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a raw query-string value. Unknown values yield `None` so the
    /// caller can fall back to the module default.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Raw, untrusted list parameters as they arrive from the HTTP layer.
/// Every field is optional; defaults and clamping come from [`ListConfig`].
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

/// A resolved sort: the field is always drawn from a module's static
/// allow-list, so it is safe to interpolate into an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub order: SortOrder,
}

/// Per-module listing configuration.
#[derive(Debug, Clone, Copy)]
pub struct ListConfig {
    /// Fields covered by free-text search.
    pub searchable_fields: &'static [&'static str],
    /// Allow-list of fields a client may sort by.
    pub sortable_fields: &'static [&'static str],
    pub default_sort: Sort,
    pub default_limit: i64,
}

impl ListConfig {
    /// Resolve the requested sort against the allow-list. Unknown fields
    /// and orders fall back to the default rather than erroring, so stale
    /// client state cannot break a listing endpoint.
    pub fn resolve_sort(&self, sort_by: Option<&str>, sort_order: Option<SortOrder>) -> Sort {
        let field = sort_by
            .and_then(|requested| self.sortable_fields.iter().find(|f| **f == requested))
            .copied()
            .unwrap_or(self.default_sort.field);
        let order = sort_order.unwrap_or(self.default_sort.order);
        Sort { field, order }
    }

    /// Clamped `(page, limit)` for a request.
    pub fn page_and_limit(&self, params: &ListParams) -> (i64, i64) {
        (
            clamp_page(params.page),
            clamp_limit(params.limit, self.default_limit),
        )
    }
}

pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: ListConfig = ListConfig {
        searchable_fields: &["name"],
        sortable_fields: &["name", "created_at"],
        default_sort: Sort {
            field: "created_at",
            order: SortOrder::Desc,
        },
        default_limit: 20,
    };

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let sort = CONFIG.resolve_sort(Some("password_hash"), None);
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn allowed_sort_field_is_used() {
        let sort = CONFIG.resolve_sort(Some("name"), Some(SortOrder::Asc));
        assert_eq!(sort.field, "name");
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn sort_order_parse_is_case_insensitive() {
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse(" desc "), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let params = ListParams {
            page: Some(-3),
            limit: Some(10_000),
            ..ListParams::default()
        };
        assert_eq!(CONFIG.page_and_limit(&params), (1, MAX_PAGE_SIZE));

        let params = ListParams::default();
        assert_eq!(CONFIG.page_and_limit(&params), (1, 20));
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        assert_eq!(clamp_limit(Some(0), 20), 1);
    }
}
