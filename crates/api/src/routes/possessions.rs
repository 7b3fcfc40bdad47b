//! Route definitions for the `/possessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::possessions;
use crate::state::AppState;

/// Routes mounted at `/possessions`.
///
/// ```text
/// GET    /             -> list_possessions
/// POST   /             -> create_possession
/// GET    /{id}         -> get_possession
/// PUT    /{id}         -> update_possession
/// DELETE /{id}         -> delete_possession (manager; soft delete)
/// POST   /{id}/status  -> set_possession_status (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(possessions::list_possessions).post(possessions::create_possession),
        )
        .route(
            "/{id}",
            get(possessions::get_possession)
                .put(possessions::update_possession)
                .delete(possessions::delete_possession),
        )
        .route("/{id}/status", post(possessions::set_possession_status))
}
