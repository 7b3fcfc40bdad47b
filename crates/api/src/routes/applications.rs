//! Route definitions for the `/applications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::applications;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET    /              -> list_applications
/// POST   /              -> create_application
/// GET    /{id}          -> get_application
/// PUT    /{id}          -> update_application
/// DELETE /{id}          -> delete_application (manager; soft delete)
/// POST   /{id}/status   -> set_application_status (manager)
/// POST   /{id}/restore  -> restore_application (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/{id}",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        .route("/{id}/status", post(applications::set_application_status))
        .route("/{id}/restore", post(applications::restore_application))
}
