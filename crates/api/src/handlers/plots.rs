//! Handlers for `/plot-categories` and `/plots`.
//!
//! A plot's sale price is derived from its category's base price and the
//! surcharges for its features; it is computed on retrieval and never
//! stored or filtered on.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::plot as plot_status;
use estato_core::types::DbId;
use estato_db::models::plot::{
    CreatePlot, CreatePlotCategory, Plot, PlotCategory, PlotListQuery, PlotSummary, PlotView,
    UpdatePlot, UpdatePlotCategory,
};
use estato_db::repositories::{PlotCategoryRepo, PlotRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /plot-categories`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Query parameters for `GET /plots`.
#[derive(Debug, Deserialize)]
pub struct PlotQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Raw reference id; validated by the listing engine.
    pub category_id: Option<String>,
    pub block: Option<String>,
    /// Comma-separated status filter.
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Plot categories
// ---------------------------------------------------------------------------

/// POST /api/v1/plot-categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(input): Json<CreatePlotCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<PlotCategory>>)> {
    let category = PlotCategoryRepo::create(&state.pool, &input, Some(manager.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

/// GET /api/v1/plot-categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<CategoryQuery>,
) -> AppResult<Json<DataResponse<Page<PlotCategory>>>> {
    let list = list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order);
    let page = PlotCategoryRepo::list(&state.pool, &list).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/plot-categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PlotCategory>>> {
    let category =
        PlotCategoryRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "PlotCategory",
                id,
            }))?;
    Ok(Json(DataResponse::new(category)))
}

/// PUT /api/v1/plot-categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlotCategory>,
) -> AppResult<Json<DataResponse<PlotCategory>>> {
    let category = PlotCategoryRepo::update(&state.pool, id, &input, Some(manager.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PlotCategory",
            id,
        }))?;
    Ok(Json(DataResponse::new(category)))
}

/// DELETE /api/v1/plot-categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PlotCategoryRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "PlotCategory",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

/// POST /api/v1/plots
pub async fn create_plot(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePlot>,
) -> AppResult<(StatusCode, Json<DataResponse<Plot>>)> {
    PlotCategoryRepo::find_by_id(&state.pool, input.category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PlotCategory",
            id: input.category_id,
        }))?;

    let plot = PlotRepo::create(&state.pool, &input, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(plot))))
}

/// GET /api/v1/plots
///
/// Paginated inventory listing with search over plot no./block, category,
/// block, and status filters, plus a by-status summary over the full
/// filtered set.
pub async fn list_plots(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<PlotQuery>,
) -> AppResult<Json<DataResponse<Page<Plot, PlotSummary>>>> {
    let params = PlotListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        category_id: q.category_id,
        block: q.block,
        statuses: csv_values(q.status.as_deref()),
    };
    let page = PlotRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/plots/{id}
///
/// Single plot with its derived sale price.
pub async fn get_plot(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PlotView>>> {
    let plot = PlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plot", id }))?;

    let price = PlotCategoryRepo::find_by_id(&state.pool, plot.category_id)
        .await?
        .map(|category| plot.price(&category));

    Ok(Json(DataResponse::new(PlotView { plot, price })))
}

/// PUT /api/v1/plots/{id}
pub async fn update_plot(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlot>,
) -> AppResult<Json<DataResponse<Plot>>> {
    if let Some(status) = input.status.as_deref() {
        if !plot_status::is_valid(status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown plot status '{status}'"
            ))));
        }
    }
    if let Some(category_id) = input.category_id {
        PlotCategoryRepo::find_by_id(&state.pool, category_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "PlotCategory",
                id: category_id,
            }))?;
    }

    let plot = PlotRepo::update(&state.pool, id, &input, Some(auth.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plot", id }))?;
    Ok(Json(DataResponse::new(plot)))
}

/// DELETE /api/v1/plots/{id}
pub async fn delete_plot(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PlotRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Plot", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/plots/{id}/restore
pub async fn restore_plot(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Plot>>> {
    let restored = PlotRepo::restore(&state.pool, id, Some(manager.user_id)).await?;
    if !restored {
        return Err(AppError::Core(CoreError::NotFound { entity: "Plot", id }));
    }
    let plot = PlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plot", id }))?;
    Ok(Json(DataResponse::new(plot)))
}
