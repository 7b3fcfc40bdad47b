//! Query-string plumbing shared by listing endpoints.
//!
//! Each listing handler declares its own typed query struct (the common
//! paging fields plus module filters); the helpers here convert the
//! common fields into core [`ListParams`] and split comma-separated
//! filter values.

use estato_core::query::{ListParams, SortOrder};

/// Build core list parameters from the raw paging fields of a handler's
/// query struct. An unrecognized `sort_order` is dropped here and the
/// module default applies downstream.
pub fn list_params(
    page: Option<i64>,
    limit: Option<i64>,
    search: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
) -> ListParams {
    ListParams {
        page,
        limit,
        search,
        sort_by,
        sort_order: sort_order.as_deref().and_then(SortOrder::parse),
    }
}

/// Split a comma-separated filter value (`?status=unpaid,paid`) into its
/// entries. Blank entries are dropped; `None` yields an empty vec.
pub fn csv_values(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_values_splits_and_trims() {
        assert_eq!(
            csv_values(Some("unpaid, paid ,waived")),
            vec!["unpaid", "paid", "waived"]
        );
    }

    #[test]
    fn csv_values_drops_blanks() {
        assert_eq!(csv_values(Some(",, ,")), Vec::<String>::new());
        assert_eq!(csv_values(None), Vec::<String>::new());
    }

    #[test]
    fn list_params_parses_sort_order() {
        let params = list_params(Some(2), None, None, None, Some("desc".into()));
        assert_eq!(params.page, Some(2));
        assert_eq!(params.sort_order, Some(SortOrder::Desc));

        let params = list_params(None, None, None, None, Some("bogus".into()));
        assert_eq!(params.sort_order, None);
    }
}
