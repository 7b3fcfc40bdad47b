//! Handlers for the `/bills` resource.
//!
//! List and detail responses carry the derived fields (`is_overdue`,
//! `days_overdue`, `payable_total`) computed after retrieval; predicates
//! only ever see stored columns.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::bill as bill_status;
use estato_core::types::{DbId, Timestamp};
use estato_db::models::bill::{Bill, BillListQuery, BillSummary, BillView, CreateBill, UpdateBill};
use estato_db::repositories::BillRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAccountant, RequireManager};
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /bills`.
#[derive(Debug, Deserialize)]
pub struct BillQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference ids; validated by the listing engine.
    pub member_id: Option<String>,
    pub plot_id: Option<String>,
    /// Comma-separated filters.
    pub bill_type: Option<String>,
    pub status: Option<String>,
    pub due_from: Option<Timestamp>,
    pub due_to: Option<Timestamp>,
}

/// POST /api/v1/bills
pub async fn create_bill(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Json(input): Json<CreateBill>,
) -> AppResult<(StatusCode, Json<DataResponse<BillView>>)> {
    if !bill_status::is_valid_type(&input.bill_type) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown bill type '{}'",
            input.bill_type
        ))));
    }
    if input.amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "Bill amount must be positive".into(),
        )));
    }

    let bill = BillRepo::create(&state.pool, &input, Some(accountant.user_id)).await?;
    let view = BillView::derive(bill, Utc::now());
    Ok((StatusCode::CREATED, Json(DataResponse::new(view))))
}

/// GET /api/v1/bills
///
/// Paginated listing with member/plot/type/status/due-date filters and a
/// collection summary over the full filtered set.
pub async fn list_bills(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<BillQuery>,
) -> AppResult<Json<DataResponse<Page<BillView, BillSummary>>>> {
    let params = BillListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        member_id: q.member_id,
        plot_id: q.plot_id,
        bill_types: csv_values(q.bill_type.as_deref()),
        statuses: csv_values(q.status.as_deref()),
        due_from: q.due_from,
        due_to: q.due_to,
    };

    let page = BillRepo::list(&state.pool, &params).await?;

    let now = Utc::now();
    let records = page
        .records
        .into_iter()
        .map(|bill| BillView::derive(bill, now))
        .collect();
    let page = Page {
        records,
        pagination: page.pagination,
        summary: page.summary,
    };
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/bills/{id}
pub async fn get_bill(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BillView>>> {
    let bill = BillRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bill", id }))?;
    Ok(Json(DataResponse::new(BillView::derive(bill, Utc::now()))))
}

/// PUT /api/v1/bills/{id}
pub async fn update_bill(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBill>,
) -> AppResult<Json<DataResponse<BillView>>> {
    if let Some(bill_type) = input.bill_type.as_deref() {
        if !bill_status::is_valid_type(bill_type) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown bill type '{bill_type}'"
            ))));
        }
    }

    let bill = BillRepo::update(&state.pool, id, &input, Some(accountant.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bill", id }))?;
    Ok(Json(DataResponse::new(BillView::derive(bill, Utc::now()))))
}

/// POST /api/v1/bills/{id}/pay
///
/// Settle an unpaid bill. 409 when the bill exists but is not unpaid.
pub async fn pay_bill(
    State(state): State<AppState>,
    RequireAccountant(accountant): RequireAccountant,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BillView>>> {
    // Distinguish "no such bill" from "bill is not unpaid".
    BillRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bill", id }))?;

    let bill = BillRepo::mark_paid(&state.pool, id, Some(accountant.user_id))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Only an unpaid bill can be paid".into(),
            ))
        })?;
    Ok(Json(DataResponse::new(BillView::derive(bill, Utc::now()))))
}

/// POST /api/v1/bills/{id}/waive
///
/// Waive an unpaid bill. Managers only; 409 when not unpaid.
pub async fn waive_bill(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BillView>>> {
    BillRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bill", id }))?;

    let bill = BillRepo::waive(&state.pool, id, Some(manager.user_id))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Only an unpaid bill can be waived".into(),
            ))
        })?;
    Ok(Json(DataResponse::new(BillView::derive(bill, Utc::now()))))
}

/// DELETE /api/v1/bills/{id}
pub async fn delete_bill(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = BillRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Bill", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}
