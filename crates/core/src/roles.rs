//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ACCOUNTANT: &str = "accountant";
pub const ROLE_CLERK: &str = "clerk";
