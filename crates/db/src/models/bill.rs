//! Bill entity model, DTOs, and post-retrieval derivations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::billing;
use estato_core::overdue;
use estato_core::query::ListParams;
use estato_core::status::bill as bill_status;
use estato_core::types::{DbId, Timestamp};

/// A row from the `bills` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bill {
    pub id: DbId,
    pub bill_no: String,
    pub member_id: DbId,
    pub plot_id: Option<DbId>,
    pub bill_type: String,
    pub amount: f64,
    pub late_surcharge_pct: f64,
    pub due_date: Timestamp,
    pub status: String,
    pub paid_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Bill row plus derived fields for API responses.
///
/// The derivations are computed after retrieval and never participate in
/// query predicates.
#[derive(Debug, Clone, Serialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: Bill,
    pub is_overdue: bool,
    pub days_overdue: i64,
    /// Amount plus late surcharge once overdue; the plain amount otherwise.
    pub payable_total: f64,
}

impl BillView {
    pub fn derive(bill: Bill, now: Timestamp) -> Self {
        let unpaid = bill.status == bill_status::UNPAID;
        let days = overdue::days_overdue(bill.due_date, now);
        let is_overdue = unpaid && days > 0;
        let payable_total =
            billing::payable_total(bill.amount, bill.late_surcharge_pct, is_overdue);
        Self {
            bill,
            is_overdue,
            days_overdue: if unpaid { days } else { 0 },
            payable_total,
        }
    }
}

/// DTO for issuing a bill.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBill {
    pub bill_no: String,
    pub member_id: DbId,
    pub plot_id: Option<DbId>,
    pub bill_type: String,
    pub amount: f64,
    pub late_surcharge_pct: Option<f64>,
    pub due_date: Timestamp,
}

/// DTO for updating a bill. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBill {
    pub bill_type: Option<String>,
    pub amount: Option<f64>,
    pub late_surcharge_pct: Option<f64>,
    pub due_date: Option<Timestamp>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct BillListQuery {
    pub list: ListParams,
    /// Raw reference ids; validated before querying.
    pub member_id: Option<String>,
    pub plot_id: Option<String>,
    pub bill_types: Vec<String>,
    pub statuses: Vec<String>,
    pub due_from: Option<Timestamp>,
    pub due_to: Option<Timestamp>,
}

/// Billing summary over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub total_amount: f64,
    pub paid_amount: f64,
    /// Share of the billed amount that has been paid, 0-100.
    pub collection_pct: f64,
}
