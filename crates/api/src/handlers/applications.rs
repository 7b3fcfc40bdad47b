//! Handlers for the `/applications` resource.
//!
//! Applications move `pending -> under_review -> approved|rejected`;
//! the transition rule lives in core and is enforced here before the
//! status write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::application as application_status;
use estato_core::types::{DbId, Timestamp};
use estato_db::models::application::{
    Application, ApplicationListQuery, ApplicationSummary, ApplicationType, CreateApplication,
    UpdateApplication,
};
use estato_db::repositories::{ApplicationRepo, ApplicationTypeRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /applications`.
#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference id; validated by the listing engine.
    pub application_type_id: Option<String>,
    /// Comma-separated status filter.
    pub status: Option<String>,
    pub submitted_from: Option<Timestamp>,
    pub submitted_to: Option<Timestamp>,
}

/// Request body for `POST /applications/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
    pub remarks: Option<String>,
}

/// POST /api/v1/applications
pub async fn create_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateApplication>,
) -> AppResult<(StatusCode, Json<DataResponse<Application>>)> {
    // Reject unknown application types up front; a foreign-key error
    // would otherwise surface as a 500.
    ApplicationTypeRepo::find_by_id(&state.pool, input.application_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ApplicationType",
            id: input.application_type_id,
        }))?;

    let application = ApplicationRepo::create(&state.pool, &input, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(application))))
}

/// GET /api/v1/applications
///
/// Paginated listing with search over applicant fields, type/status/date
/// filters, and a by-status summary over the full filtered set.
pub async fn list_applications(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<ApplicationQuery>,
) -> AppResult<Json<DataResponse<Page<Application, ApplicationSummary>>>> {
    let params = ApplicationListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        application_type_id: q.application_type_id,
        statuses: csv_values(q.status.as_deref()),
        submitted_from: q.submitted_from,
        submitted_to: q.submitted_to,
    };
    let page = ApplicationRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Application>>> {
    let application =
        ApplicationRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Application",
                id,
            }))?;
    Ok(Json(DataResponse::new(application)))
}

/// PUT /api/v1/applications/{id}
pub async fn update_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateApplication>,
) -> AppResult<Json<DataResponse<Application>>> {
    let application = ApplicationRepo::update(&state.pool, id, &input, Some(auth.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Application",
            id,
        }))?;
    Ok(Json(DataResponse::new(application)))
}

/// POST /api/v1/applications/{id}/status
///
/// Advance the review workflow. Illegal transitions (skipping review,
/// leaving a terminal state) are rejected with 409.
pub async fn set_application_status(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<DataResponse<Application>>> {
    if !application_status::is_valid(&input.status) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown application status '{}'",
            input.status
        ))));
    }

    let current = ApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Application",
            id,
        }))?;

    if !application_status::can_transition(&current.status, &input.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot move application from '{}' to '{}'",
            current.status, input.status
        ))));
    }

    if let Some(remarks) = input.remarks {
        ApplicationRepo::update(
            &state.pool,
            id,
            &UpdateApplication {
                applicant_name: None,
                cnic: None,
                phone: None,
                application_type_id: None,
                remarks: Some(remarks),
            },
            Some(manager.user_id),
        )
        .await?;
    }

    let application =
        ApplicationRepo::set_status(&state.pool, id, &input.status, Some(manager.user_id))
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Application",
                id,
            }))?;
    Ok(Json(DataResponse::new(application)))
}

/// DELETE /api/v1/applications/{id}
pub async fn delete_application(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ApplicationRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Application",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/applications/{id}/restore
pub async fn restore_application(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Application>>> {
    let restored = ApplicationRepo::restore(&state.pool, id, Some(manager.user_id)).await?;
    if !restored {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Application",
            id,
        }));
    }
    let application =
        ApplicationRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Application",
                id,
            }))?;
    Ok(Json(DataResponse::new(application)))
}

/// GET /api/v1/application-types
///
/// The seeded application-type catalogue.
pub async fn list_application_types(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ApplicationType>>>> {
    let types = ApplicationTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(types)))
}
