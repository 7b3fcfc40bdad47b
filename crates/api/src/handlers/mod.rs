//! HTTP handlers, one module per resource.

pub mod applications;
pub mod auth;
pub mod bills;
pub mod defaulters;
pub mod installments;
pub mod members;
pub mod notifications;
pub mod plots;
pub mod possessions;
pub mod users;
