//! Handlers for the `/defaulters` resource (delinquency records).
//!
//! Responses carry the derived aging fields (`days_overdue`, bucket,
//! recommended stage); escalation itself is an explicit operator action
//! that only moves up the ladder.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::defaulter as defaulter_stage;
use estato_core::types::DbId;
use estato_db::models::defaulter::{
    CreateDefaulter, Defaulter, DefaulterListQuery, DefaulterSummary, DefaulterView,
    UpdateDefaulter,
};
use estato_db::repositories::DefaulterRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAccountant, RequireManager};
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /defaulters`.
#[derive(Debug, Deserialize)]
pub struct DefaulterQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference id; validated by the listing engine.
    pub member_id: Option<String>,
    /// Comma-separated stage filter.
    pub stage: Option<String>,
    pub min_outstanding: Option<f64>,
    pub max_outstanding: Option<f64>,
}

/// Request body for `POST /defaulters/{id}/escalate`.
#[derive(Debug, Deserialize)]
pub struct EscalateRequest {
    pub stage: String,
}

/// POST /api/v1/defaulters
pub async fn create_defaulter(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Json(input): Json<CreateDefaulter>,
) -> AppResult<(StatusCode, Json<DataResponse<DefaulterView>>)> {
    if input.outstanding_amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "Outstanding amount must be positive".into(),
        )));
    }

    let defaulter = DefaulterRepo::create(&state.pool, &input, Some(accountant.user_id)).await?;
    let view = DefaulterView::derive(defaulter, Utc::now());
    Ok((StatusCode::CREATED, Json(DataResponse::new(view))))
}

/// GET /api/v1/defaulters
///
/// Paginated listing with member/stage/outstanding-range filters and a
/// recovery summary (per-stage counts, outstanding totals) over the full
/// filtered set.
pub async fn list_defaulters(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<DefaulterQuery>,
) -> AppResult<Json<DataResponse<Page<DefaulterView, DefaulterSummary>>>> {
    let params = DefaulterListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        member_id: q.member_id,
        stages: csv_values(q.stage.as_deref()),
        min_outstanding: q.min_outstanding,
        max_outstanding: q.max_outstanding,
    };

    let page = DefaulterRepo::list(&state.pool, &params).await?;

    let now = Utc::now();
    let records = page
        .records
        .into_iter()
        .map(|defaulter| DefaulterView::derive(defaulter, now))
        .collect();
    let page = Page {
        records,
        pagination: page.pagination,
        summary: page.summary,
    };
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/defaulters/{id}
pub async fn get_defaulter(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DefaulterView>>> {
    let defaulter =
        DefaulterRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Defaulter",
                id,
            }))?;
    Ok(Json(DataResponse::new(DefaulterView::derive(
        defaulter,
        Utc::now(),
    ))))
}

/// PUT /api/v1/defaulters/{id}
pub async fn update_defaulter(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDefaulter>,
) -> AppResult<Json<DataResponse<DefaulterView>>> {
    let defaulter = DefaulterRepo::update(&state.pool, id, &input, Some(accountant.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defaulter",
            id,
        }))?;
    Ok(Json(DataResponse::new(DefaulterView::derive(
        defaulter,
        Utc::now(),
    ))))
}

/// POST /api/v1/defaulters/{id}/escalate
///
/// Move a defaulter up the escalation ladder. Downward or sideways moves
/// are a 409.
pub async fn escalate_defaulter(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<EscalateRequest>,
) -> AppResult<Json<DataResponse<DefaulterView>>> {
    if !defaulter_stage::is_valid(&input.stage) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown escalation stage '{}'",
            input.stage
        ))));
    }

    let current = DefaulterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defaulter",
            id,
        }))?;

    if !defaulter_stage::can_escalate(&current.stage, &input.stage) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot escalate from '{}' to '{}'",
            current.stage, input.stage
        ))));
    }

    let defaulter = DefaulterRepo::set_stage(&state.pool, id, &input.stage, Some(manager.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defaulter",
            id,
        }))?;
    Ok(Json(DataResponse::new(DefaulterView::derive(
        defaulter,
        Utc::now(),
    ))))
}

/// DELETE /api/v1/defaulters/{id}
///
/// Close a defaulter record (soft delete), e.g. after full recovery.
pub async fn delete_defaulter(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = DefaulterRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Defaulter",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
