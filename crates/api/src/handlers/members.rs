//! Handlers for the `/members` resource (allottee registry).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estato_core::error::CoreError;
use estato_core::query::Page;
use estato_core::status::member as member_status;
use estato_core::types::{DbId, Timestamp};
use estato_db::models::member::{
    CreateMember, Member, MemberListQuery, MemberSummary, UpdateMember,
};
use estato_db::repositories::MemberRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::{csv_values, list_params};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /members`.
#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Comma-separated status filter, e.g. `status=active,suspended`.
    pub status: Option<String>,
    pub joined_from: Option<Timestamp>,
    pub joined_to: Option<Timestamp>,
}

/// POST /api/v1/members
pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<DataResponse<Member>>)> {
    let member = MemberRepo::create(&state.pool, &input, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}

/// GET /api/v1/members
///
/// Paginated listing with search over name/CNIC/membership no./phone,
/// status-set and joined-date filters, and a by-status summary over the
/// full filtered set.
pub async fn list_members(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<MemberQuery>,
) -> AppResult<Json<DataResponse<Page<Member, MemberSummary>>>> {
    let params = MemberListQuery {
        list: list_params(q.page, q.limit, q.search, q.sort_by, q.sort_order),
        statuses: csv_values(q.status.as_deref()),
        joined_from: q.joined_from,
        joined_to: q.joined_to,
    };
    let page = MemberRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Member>>> {
    let member = MemberRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id,
        }))?;
    Ok(Json(DataResponse::new(member)))
}

/// PUT /api/v1/members/{id}
pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMember>,
) -> AppResult<Json<DataResponse<Member>>> {
    if let Some(status) = input.status.as_deref() {
        if !member_status::is_valid(status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown member status '{status}'"
            ))));
        }
    }

    let member = MemberRepo::update(&state.pool, id, &input, Some(auth.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id,
        }))?;
    Ok(Json(DataResponse::new(member)))
}

/// DELETE /api/v1/members/{id}
///
/// Soft-delete; the row stays for audit and can be restored.
pub async fn delete_member(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = MemberRepo::soft_delete(&state.pool, id, Some(manager.user_id)).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/members/{id}/restore
pub async fn restore_member(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Member>>> {
    let restored = MemberRepo::restore(&state.pool, id, Some(manager.user_id)).await?;
    if !restored {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id,
        }));
    }
    let member = MemberRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id,
        }))?;
    Ok(Json(DataResponse::new(member)))
}
