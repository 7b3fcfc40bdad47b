//! Installment entity model and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A row from the `installments` table: one slice of a plot payment plan.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Installment {
    pub id: DbId,
    pub plot_id: DbId,
    pub member_id: DbId,
    pub installment_no: i32,
    pub amount: f64,
    pub paid_amount: f64,
    pub due_date: Timestamp,
    pub status: String,
    pub last_payment_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for creating one installment of a payment plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstallment {
    pub plot_id: DbId,
    pub member_id: DbId,
    pub installment_no: i32,
    pub amount: f64,
    pub due_date: Timestamp,
}

/// DTO for correcting an installment. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInstallment {
    pub amount: Option<f64>,
    pub due_date: Option<Timestamp>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct InstallmentListQuery {
    pub list: ListParams,
    /// Raw reference ids; validated before querying.
    pub plot_id: Option<String>,
    pub member_id: Option<String>,
    pub statuses: Vec<String>,
    pub due_from: Option<Timestamp>,
    pub due_to: Option<Timestamp>,
}

/// Collection summary over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub total_amount: f64,
    pub total_paid: f64,
    /// Share of the scheduled amount collected so far, 0-100.
    pub collection_pct: f64,
}
