//! Possession (handover) entity model and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A row from the `possessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Possession {
    pub id: DbId,
    pub plot_id: DbId,
    pub member_id: DbId,
    pub status: String,
    pub scheduled_for: Option<Timestamp>,
    pub handed_over_at: Option<Timestamp>,
    pub remarks: Option<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for opening a possession request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePossession {
    pub plot_id: DbId,
    pub member_id: DbId,
    pub remarks: Option<String>,
}

/// DTO for amending a possession record. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePossession {
    pub scheduled_for: Option<Timestamp>,
    pub remarks: Option<String>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct PossessionListQuery {
    pub list: ListParams,
    /// Raw reference id; validated before querying.
    pub member_id: Option<String>,
    pub statuses: Vec<String>,
    pub requested_from: Option<Timestamp>,
    pub requested_to: Option<Timestamp>,
}

/// Workflow-stage breakdown over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct PossessionSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}
