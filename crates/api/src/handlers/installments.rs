//! Handlers for the `/installments` resource (plot payment plans).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::installment as installment_status;
use estato_core::types::{DbId, Timestamp};
use estato_db::models::installment::{
    CreateInstallment, Installment, InstallmentListQuery, InstallmentSummary, UpdateInstallment,
};
use estato_db::repositories::InstallmentRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAccountant, RequireManager};
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /installments`.
#[derive(Debug, Deserialize)]
pub struct InstallmentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference ids; validated by the listing engine.
    pub plot_id: Option<String>,
    pub member_id: Option<String>,
    /// Comma-separated status filter.
    pub status: Option<String>,
    pub due_from: Option<Timestamp>,
    pub due_to: Option<Timestamp>,
}

/// Request body for `POST /installments/{id}/payments`.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: f64,
}

/// POST /api/v1/installments
pub async fn create_installment(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Json(input): Json<CreateInstallment>,
) -> AppResult<(StatusCode, Json<DataResponse<Installment>>)> {
    if input.amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "Installment amount must be positive".into(),
        )));
    }
    if input.installment_no < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "Installment number starts at 1".into(),
        )));
    }

    let installment =
        InstallmentRepo::create(&state.pool, &input, Some(accountant.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(installment))))
}

/// GET /api/v1/installments
///
/// Paginated listing with plot/member/status/due filters and a collection
/// summary (totals and percentage) over the full filtered set.
pub async fn list_installments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<InstallmentQuery>,
) -> AppResult<Json<DataResponse<Page<Installment, InstallmentSummary>>>> {
    let params = InstallmentListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        plot_id: q.plot_id,
        member_id: q.member_id,
        statuses: csv_values(q.status.as_deref()),
        due_from: q.due_from,
        due_to: q.due_to,
    };
    let page = InstallmentRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/installments/{id}
pub async fn get_installment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Installment>>> {
    let installment =
        InstallmentRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Installment",
                id,
            }))?;
    Ok(Json(DataResponse::new(installment)))
}

/// PUT /api/v1/installments/{id}
pub async fn update_installment(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInstallment>,
) -> AppResult<Json<DataResponse<Installment>>> {
    let installment = InstallmentRepo::update(&state.pool, id, &input, Some(accountant.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Installment",
            id,
        }))?;
    Ok(Json(DataResponse::new(installment)))
}

/// POST /api/v1/installments/{id}/payments
///
/// Record a payment. The paid amount accumulates and the status is
/// re-derived (`pending -> partial -> paid`). Paying an already-paid
/// installment is a 409.
pub async fn record_payment(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Path(id): Path<DbId>,
    Json(input): Json<RecordPaymentRequest>,
) -> AppResult<Json<DataResponse<Installment>>> {
    if input.amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "Payment amount must be positive".into(),
        )));
    }

    let current = InstallmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Installment",
            id,
        }))?;
    if current.status == installment_status::PAID {
        return Err(AppError::Core(CoreError::Conflict(
            "Installment is already fully paid".into(),
        )));
    }

    let installment =
        InstallmentRepo::record_payment(&state.pool, id, input.amount, Some(accountant.user_id))
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Installment",
                id,
            }))?;
    Ok(Json(DataResponse::new(installment)))
}

/// DELETE /api/v1/installments/{id}
pub async fn delete_installment(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = InstallmentRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Installment",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
