//! Route definitions for `/plot-categories` and `/plots`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::plots;
use crate::state::AppState;

/// Routes mounted at `/plot-categories`.
///
/// ```text
/// GET    /      -> list_categories
/// POST   /      -> create_category (manager)
/// GET    /{id}  -> get_category
/// PUT    /{id}  -> update_category (manager)
/// DELETE /{id}  -> delete_category (manager; soft delete)
/// ```
pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(plots::list_categories).post(plots::create_category),
        )
        .route(
            "/{id}",
            get(plots::get_category)
                .put(plots::update_category)
                .delete(plots::delete_category),
        )
}

/// Routes mounted at `/plots`.
///
/// ```text
/// GET    /              -> list_plots
/// POST   /              -> create_plot
/// GET    /{id}          -> get_plot (with derived price)
/// PUT    /{id}          -> update_plot
/// DELETE /{id}          -> delete_plot (manager; soft delete)
/// POST   /{id}/restore  -> restore_plot (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(plots::list_plots).post(plots::create_plot))
        .route(
            "/{id}",
            get(plots::get_plot)
                .put(plots::update_plot)
                .delete(plots::delete_plot),
        )
        .route("/{id}/restore", post(plots::restore_plot))
}
