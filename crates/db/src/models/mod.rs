//! Entity models: one module per table family, each holding the row
//! struct, Create/Update DTOs, and the list-query parameter struct its
//! repository accepts.

pub mod application;
pub mod bill;
pub mod defaulter;
pub mod installment;
pub mod member;
pub mod notification;
pub mod plot;
pub mod possession;
pub mod role;
pub mod session;
pub mod user;
