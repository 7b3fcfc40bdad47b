//! Route definitions for the `/defaulters` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::defaulters;
use crate::state::AppState;

/// Routes mounted at `/defaulters`.
///
/// ```text
/// GET    /               -> list_defaulters
/// POST   /               -> create_defaulter (accountant)
/// GET    /{id}           -> get_defaulter
/// PUT    /{id}           -> update_defaulter (accountant)
/// DELETE /{id}           -> delete_defaulter (manager; soft delete)
/// POST   /{id}/escalate  -> escalate_defaulter (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(defaulters::list_defaulters).post(defaulters::create_defaulter),
        )
        .route(
            "/{id}",
            get(defaulters::get_defaulter)
                .put(defaulters::update_defaulter)
                .delete(defaulters::delete_defaulter),
        )
        .route("/{id}/escalate", post(defaulters::escalate_defaulter))
}
