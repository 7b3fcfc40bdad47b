//! Route definitions for the `/installments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::installments;
use crate::state::AppState;

/// Routes mounted at `/installments`.
///
/// ```text
/// GET    /               -> list_installments
/// POST   /               -> create_installment (accountant)
/// GET    /{id}           -> get_installment
/// PUT    /{id}           -> update_installment (accountant)
/// DELETE /{id}           -> delete_installment (manager; soft delete)
/// POST   /{id}/payments  -> record_payment (accountant)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(installments::list_installments).post(installments::create_installment),
        )
        .route(
            "/{id}",
            get(installments::get_installment)
                .put(installments::update_installment)
                .delete(installments::delete_installment),
        )
        .route("/{id}/payments", post(installments::record_payment))
}
