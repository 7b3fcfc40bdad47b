//! Overdue aging for bills, installments, and defaulter records.
//!
//! These are pure derivations applied to rows after retrieval; they never
//! participate in query predicates.

use serde::Serialize;

use crate::status::defaulter;
use crate::types::Timestamp;

/// Whole days past the due date; 0 when the due date has not passed.
pub fn days_overdue(due_date: Timestamp, now: Timestamp) -> i64 {
    (now - due_date).num_days().max(0)
}

/// Aging bucket for receivables reports: 1-30, 31-60, 61-90, over 90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    Current,
    D30,
    D60,
    D90,
    Over90,
}

pub fn aging_bucket(days: i64) -> AgingBucket {
    match days {
        d if d <= 0 => AgingBucket::Current,
        d if d <= 30 => AgingBucket::D30,
        d if d <= 60 => AgingBucket::D60,
        d if d <= 90 => AgingBucket::D90,
        _ => AgingBucket::Over90,
    }
}

/// Escalation stage recommended for the given delinquency age.
///
/// Actual escalation is an explicit operator action; this only suggests.
pub fn recommended_stage(days: i64) -> &'static str {
    match days {
        d if d <= 30 => defaulter::NOTICE_1,
        d if d <= 60 => defaulter::NOTICE_2,
        d if d <= 90 => defaulter::FINAL_NOTICE,
        _ => defaulter::LEGAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn not_yet_due_is_zero_days() {
        let now = Utc::now();
        let due = now + Duration::days(5);
        assert_eq!(days_overdue(due, now), 0);
    }

    #[test]
    fn past_due_counts_whole_days() {
        let now = Utc::now();
        let due = now - Duration::days(17);
        assert_eq!(days_overdue(due, now), 17);
    }

    #[test]
    fn aging_bucket_boundaries() {
        assert_eq!(aging_bucket(0), AgingBucket::Current);
        assert_eq!(aging_bucket(1), AgingBucket::D30);
        assert_eq!(aging_bucket(30), AgingBucket::D30);
        assert_eq!(aging_bucket(31), AgingBucket::D60);
        assert_eq!(aging_bucket(60), AgingBucket::D60);
        assert_eq!(aging_bucket(61), AgingBucket::D90);
        assert_eq!(aging_bucket(90), AgingBucket::D90);
        assert_eq!(aging_bucket(91), AgingBucket::Over90);
        assert_eq!(aging_bucket(400), AgingBucket::Over90);
    }

    #[test]
    fn recommended_stage_follows_age() {
        assert_eq!(recommended_stage(10), defaulter::NOTICE_1);
        assert_eq!(recommended_stage(45), defaulter::NOTICE_2);
        assert_eq!(recommended_stage(75), defaulter::FINAL_NOTICE);
        assert_eq!(recommended_stage(120), defaulter::LEGAL);
    }
}
