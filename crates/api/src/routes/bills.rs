//! Route definitions for the `/bills` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bills;
use crate::state::AppState;

/// Routes mounted at `/bills`.
///
/// ```text
/// GET    /            -> list_bills
/// POST   /            -> create_bill (accountant)
/// GET    /{id}        -> get_bill
/// PUT    /{id}        -> update_bill (accountant)
/// DELETE /{id}        -> delete_bill (manager; soft delete)
/// POST   /{id}/pay    -> pay_bill (accountant)
/// POST   /{id}/waive  -> waive_bill (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bills::list_bills).post(bills::create_bill))
        .route(
            "/{id}",
            get(bills::get_bill)
                .put(bills::update_bill)
                .delete(bills::delete_bill),
        )
        .route("/{id}/pay", post(bills::pay_bill))
        .route("/{id}/waive", post(bills::waive_bill))
}
