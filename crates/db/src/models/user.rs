//! Staff user entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// Resolved role name (e.g. `"admin"`, `"accountant"`).
    pub role: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Filterable listing parameters for staff administration.
#[derive(Debug, Default)]
pub struct UserListQuery {
    pub list: ListParams,
    /// Raw reference id; validated before querying.
    pub role_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Staff headcount summary over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    /// Headcount keyed by role id (rendered as text).
    pub by_role: std::collections::BTreeMap<String, i64>,
}
