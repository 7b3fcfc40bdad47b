//! Member (allottee) entity model and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub membership_no: String,
    pub name: String,
    pub cnic: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub joined_at: Timestamp,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for registering a member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub membership_no: String,
    pub name: String,
    pub cnic: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// DTO for updating a member. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMember {
    pub name: Option<String>,
    pub cnic: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct MemberListQuery {
    pub list: ListParams,
    pub statuses: Vec<String>,
    pub joined_from: Option<Timestamp>,
    pub joined_to: Option<Timestamp>,
}

/// Status breakdown over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}
