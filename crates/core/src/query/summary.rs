//! Grouped summary aggregation over a filtered record set.
//!
//! A [`GroupSpec`] names one group-by column and the numeric columns to
//! sum/average per group. Stores execute the spec against the full
//! filtered set (never the current page) and return [`GroupRow`]s; the
//! helpers here fold those rows into module summaries. Categories with no
//! matching records are omitted, not zero-filled.

use std::collections::BTreeMap;

/// Specification of one grouped aggregation.
#[derive(Debug, Clone, Copy)]
pub struct GroupSpec {
    pub group_by: &'static str,
    pub sum_fields: &'static [&'static str],
    pub avg_fields: &'static [&'static str],
}

/// One group produced by [`crate::query::Store::aggregate`].
///
/// `sums` and `avgs` are parallel to the spec's `sum_fields`/`avg_fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Group key rendered as text; `None` when the grouped column is null.
    pub key: Option<String>,
    pub count: i64,
    pub sums: Vec<f64>,
    pub avgs: Vec<f64>,
}

/// Per-group counts keyed by group value. Null keys are reported under
/// `"unknown"`.
pub fn counts_by_key(rows: &[GroupRow]) -> BTreeMap<String, i64> {
    rows.iter()
        .map(|r| {
            (
                r.key.clone().unwrap_or_else(|| "unknown".to_string()),
                r.count,
            )
        })
        .collect()
}

/// Total record count across all groups. Equals the predicate's match
/// count when the grouped column covers every record.
pub fn total_count(rows: &[GroupRow]) -> i64 {
    rows.iter().map(|r| r.count).sum()
}

/// Sum of the `idx`-th sum column across all groups.
pub fn sum_across(rows: &[GroupRow], idx: usize) -> f64 {
    rows.iter()
        .map(|r| r.sums.get(idx).copied().unwrap_or(0.0))
        .sum()
}

/// Count-weighted average of the `idx`-th avg column across all groups.
/// Returns 0 when no records matched.
pub fn avg_across(rows: &[GroupRow], idx: usize) -> f64 {
    let total = total_count(rows);
    if total == 0 {
        return 0.0;
    }
    let weighted: f64 = rows
        .iter()
        .map(|r| r.avgs.get(idx).copied().unwrap_or(0.0) * r.count as f64)
        .sum();
    weighted / total as f64
}

/// Ratio guarded against a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, count: i64, sums: Vec<f64>, avgs: Vec<f64>) -> GroupRow {
        GroupRow {
            key: Some(key.to_string()),
            count,
            sums,
            avgs,
        }
    }

    #[test]
    fn counts_by_key_maps_groups() {
        let rows = vec![
            row("paid", 7, vec![], vec![]),
            row("unpaid", 3, vec![], vec![]),
        ];
        let counts = counts_by_key(&rows);
        assert_eq!(counts.get("paid"), Some(&7));
        assert_eq!(counts.get("unpaid"), Some(&3));
        // Absent categories are omitted, not zero-filled.
        assert_eq!(counts.get("waived"), None);
    }

    #[test]
    fn null_group_key_is_reported_as_unknown() {
        let rows = vec![GroupRow {
            key: None,
            count: 2,
            sums: vec![],
            avgs: vec![],
        }];
        assert_eq!(counts_by_key(&rows).get("unknown"), Some(&2));
    }

    #[test]
    fn totals_and_sums_fold_across_groups() {
        let rows = vec![
            row("pending", 2, vec![100.0, 10.0], vec![]),
            row("paid", 3, vec![200.0, 30.0], vec![]),
        ];
        assert_eq!(total_count(&rows), 5);
        assert_eq!(sum_across(&rows, 0), 300.0);
        assert_eq!(sum_across(&rows, 1), 40.0);
    }

    #[test]
    fn avg_across_is_count_weighted() {
        let rows = vec![
            row("a", 1, vec![], vec![10.0]),
            row("b", 3, vec![], vec![50.0]),
        ];
        assert_eq!(avg_across(&rows, 0), 40.0);
    }

    #[test]
    fn empty_aggregates_are_zero() {
        assert_eq!(total_count(&[]), 0);
        assert_eq!(sum_across(&[], 0), 0.0);
        assert_eq!(avg_across(&[], 0), 0.0);
        assert_eq!(ratio(5.0, 0.0), 0.0);
    }
}
