pub mod admin;
pub mod applications;
pub mod auth;
pub mod bills;
pub mod defaulters;
pub mod health;
pub mod installments;
pub mod members;
pub mod notifications;
pub mod plots;
pub mod possessions;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
///
/// /admin/users                       staff list, create (admin only)
/// /admin/users/{id}                  get, update, soft delete
/// /admin/users/{id}/reset-password   reset password
/// /admin/roles                       seeded role catalogue
///
/// /application-types                 seeded application-type catalogue
/// /applications                      list, create
/// /applications/{id}                 get, update, delete
/// /applications/{id}/status          review workflow transition (manager)
/// /applications/{id}/restore         restore a soft-deleted row (manager)
///
/// /members                           list, create
/// /members/{id}                      get, update, delete
/// /members/{id}/restore              restore (manager)
///
/// /plot-categories                   list, create (manager)
/// /plot-categories/{id}              get, update, delete (manager)
/// /plots                             list, create
/// /plots/{id}                        get (with derived price), update, delete
/// /plots/{id}/restore                restore (manager)
///
/// /bills                             list, create (accountant)
/// /bills/{id}                        get, update, delete
/// /bills/{id}/pay                    settle an unpaid bill (accountant)
/// /bills/{id}/waive                  waive an unpaid bill (manager)
///
/// /installments                      list, create (accountant)
/// /installments/{id}                 get, update, delete
/// /installments/{id}/payments        record a payment (accountant)
///
/// /possessions                       list, create
/// /possessions/{id}                  get, update, delete
/// /possessions/{id}/status           handover workflow transition (manager)
///
/// /defaulters                        list, create (accountant)
/// /defaulters/{id}                   get, update, delete
/// /defaulters/{id}/escalate          move up the escalation ladder (manager)
///
/// /notifications                     list own, create (manager)
/// /notifications/read-all            mark all read
/// /notifications/unread-count        unread count
/// /notifications/{id}/read           mark one read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .route(
            "/application-types",
            get(handlers::applications::list_application_types),
        )
        .nest("/applications", applications::router())
        .nest("/members", members::router())
        .nest("/plot-categories", plots::categories_router())
        .nest("/plots", plots::router())
        .nest("/bills", bills::router())
        .nest("/installments", installments::router())
        .nest("/possessions", possessions::router())
        .nest("/defaulters", defaulters::router())
        .nest("/notifications", notifications::router())
}
