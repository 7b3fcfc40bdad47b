//! Notification entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub category: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub category: String,
    pub title: String,
    pub body: String,
}

/// Well-known notification categories.
pub mod categories {
    pub const APPLICATION: &str = "application";
    pub const BILLING: &str = "billing";
    pub const POSSESSION: &str = "possession";
    pub const RECOVERY: &str = "recovery";
    pub const SYSTEM: &str = "system";
}
