//! Route definitions for the `/members` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::members;
use crate::state::AppState;

/// Routes mounted at `/members`.
///
/// ```text
/// GET    /              -> list_members
/// POST   /              -> create_member
/// GET    /{id}          -> get_member
/// PUT    /{id}          -> update_member
/// DELETE /{id}          -> delete_member (manager; soft delete)
/// POST   /{id}/restore  -> restore_member (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route("/{id}/restore", post(members::restore_member))
}
