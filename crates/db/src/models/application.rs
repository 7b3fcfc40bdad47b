//! Application entity model and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A seeded row from the `application_types` table (e.g. "new membership",
/// "plot booking", "transfer").
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApplicationType {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    pub id: DbId,
    pub application_no: String,
    pub applicant_name: String,
    pub cnic: String,
    pub phone: String,
    pub application_type_id: DbId,
    pub status: String,
    pub submitted_at: Timestamp,
    pub remarks: Option<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for registering a new application.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplication {
    pub application_no: String,
    pub applicant_name: String,
    pub cnic: String,
    pub phone: String,
    pub application_type_id: DbId,
    pub remarks: Option<String>,
}

/// DTO for updating an application. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplication {
    pub applicant_name: Option<String>,
    pub cnic: Option<String>,
    pub phone: Option<String>,
    pub application_type_id: Option<DbId>,
    pub remarks: Option<String>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct ApplicationListQuery {
    pub list: ListParams,
    /// Raw reference id; validated before querying.
    pub application_type_id: Option<String>,
    pub statuses: Vec<String>,
    pub submitted_from: Option<Timestamp>,
    pub submitted_to: Option<Timestamp>,
}

/// Status breakdown over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}
