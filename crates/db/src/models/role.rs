//! Role entity model.

use serde::Serialize;
use sqlx::FromRow;

use estato_core::types::{DbId, Timestamp};

/// A row from the `roles` table. Roles are seeded by migration and not
/// editable through the API.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}
