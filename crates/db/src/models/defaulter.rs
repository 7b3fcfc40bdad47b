//! Defaulter entity model, DTOs, and post-retrieval aging derivations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::overdue::{self, AgingBucket};
use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A row from the `defaulters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Defaulter {
    pub id: DbId,
    pub member_id: DbId,
    pub plot_id: Option<DbId>,
    pub outstanding_amount: f64,
    pub oldest_due_date: Timestamp,
    pub stage: String,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Defaulter row plus derived aging fields for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DefaulterView {
    #[serde(flatten)]
    pub defaulter: Defaulter,
    pub days_overdue: i64,
    pub aging_bucket: AgingBucket,
    /// Stage the aging rules suggest; escalation itself stays an explicit
    /// operator action.
    pub recommended_stage: &'static str,
}

impl DefaulterView {
    pub fn derive(defaulter: Defaulter, now: Timestamp) -> Self {
        let days = overdue::days_overdue(defaulter.oldest_due_date, now);
        Self {
            defaulter,
            days_overdue: days,
            aging_bucket: overdue::aging_bucket(days),
            recommended_stage: overdue::recommended_stage(days),
        }
    }
}

/// DTO for opening a defaulter record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDefaulter {
    pub member_id: DbId,
    pub plot_id: Option<DbId>,
    pub outstanding_amount: f64,
    pub oldest_due_date: Timestamp,
}

/// DTO for updating a defaulter record. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDefaulter {
    pub outstanding_amount: Option<f64>,
    pub oldest_due_date: Option<Timestamp>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct DefaulterListQuery {
    pub list: ListParams,
    /// Raw reference id; validated before querying.
    pub member_id: Option<String>,
    pub stages: Vec<String>,
    pub min_outstanding: Option<f64>,
    pub max_outstanding: Option<f64>,
}

/// Recovery summary over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct DefaulterSummary {
    pub total: i64,
    pub by_stage: BTreeMap<String, i64>,
    pub total_outstanding: f64,
    pub avg_outstanding: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use estato_core::status::defaulter as stage;

    #[test]
    fn view_derives_aging_from_oldest_due_date() {
        let now = Utc::now();
        let record = Defaulter {
            id: 1,
            member_id: 9,
            plot_id: None,
            outstanding_amount: 80_000.0,
            oldest_due_date: now - Duration::days(75),
            stage: stage::NOTICE_1.to_string(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let view = DefaulterView::derive(record, now);
        assert_eq!(view.days_overdue, 75);
        assert_eq!(view.aging_bucket, AgingBucket::D90);
        assert_eq!(view.recommended_stage, stage::FINAL_NOTICE);
    }
}
