//! Shared response envelope for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Paginated listings
//! put the whole `Page` (records, pagination, summary) inside `data`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
