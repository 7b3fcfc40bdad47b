//! Core domain logic for the Estato society back office.
//!
//! This crate has no persistence or HTTP dependencies. It holds the shared
//! types and error taxonomy, the generic listing engine (filtering,
//! pagination, summary aggregation over an abstract store), the status
//! vocabularies with their transition rules, and the pure derived-field
//! computations (overdue aging, bill totals, surcharge pricing).

pub mod billing;
pub mod error;
pub mod overdue;
pub mod query;
pub mod roles;
pub mod status;
pub mod types;
