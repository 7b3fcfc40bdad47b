//! Handlers for the `/possessions` resource (plot handover workflow).
//!
//! The workflow moves one step forward at a time
//! (`requested -> documents_verified -> dues_cleared -> scheduled ->
//! handed_over`); any non-terminal state may be rejected. The rule lives
//! in core and is enforced before the status write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::possession as possession_status;
use estato_core::types::{DbId, Timestamp};
use estato_db::models::possession::{
    CreatePossession, Possession, PossessionListQuery, PossessionSummary, UpdatePossession,
};
use estato_db::repositories::PossessionRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /possessions`.
#[derive(Debug, Deserialize)]
pub struct PossessionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference id; validated by the listing engine.
    pub member_id: Option<String>,
    /// Comma-separated status filter.
    pub status: Option<String>,
    pub requested_from: Option<Timestamp>,
    pub requested_to: Option<Timestamp>,
}

/// Request body for `POST /possessions/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// POST /api/v1/possessions
pub async fn create_possession(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePossession>,
) -> AppResult<(StatusCode, Json<DataResponse<Possession>>)> {
    let possession = PossessionRepo::create(&state.pool, &input, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(possession))))
}

/// GET /api/v1/possessions
///
/// Paginated listing with member/status/request-date filters and a
/// workflow-stage summary over the full filtered set.
pub async fn list_possessions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<PossessionQuery>,
) -> AppResult<Json<DataResponse<Page<Possession, PossessionSummary>>>> {
    let params = PossessionListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        member_id: q.member_id,
        statuses: csv_values(q.status.as_deref()),
        requested_from: q.requested_from,
        requested_to: q.requested_to,
    };
    let page = PossessionRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/possessions/{id}
pub async fn get_possession(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Possession>>> {
    let possession =
        PossessionRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Possession",
                id,
            }))?;
    Ok(Json(DataResponse::new(possession)))
}

/// PUT /api/v1/possessions/{id}
///
/// Amend the schedule or remarks; status changes go through the status
/// endpoint.
pub async fn update_possession(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePossession>,
) -> AppResult<Json<DataResponse<Possession>>> {
    let possession = PossessionRepo::update(&state.pool, id, &input, Some(auth.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Possession",
            id,
        }))?;
    Ok(Json(DataResponse::new(possession)))
}

/// POST /api/v1/possessions/{id}/status
///
/// Advance the handover workflow one step, or reject it. Illegal
/// transitions are a 409.
pub async fn set_possession_status(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<DataResponse<Possession>>> {
    if !possession_status::is_valid(&input.status) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown possession status '{}'",
            input.status
        ))));
    }

    let current = PossessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Possession",
            id,
        }))?;

    if !possession_status::can_transition(&current.status, &input.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot move possession from '{}' to '{}'",
            current.status, input.status
        ))));
    }

    let possession =
        PossessionRepo::set_status(&state.pool, id, &input.status, Some(manager.user_id))
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Possession",
                id,
            }))?;
    Ok(Json(DataResponse::new(possession)))
}

/// DELETE /api/v1/possessions/{id}
pub async fn delete_possession(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PossessionRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Possession",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
