//! Admin handlers: users and statistics.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use portal_db::User;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::{CurrentUser, RequestContext};
use crate::models::{AdminUpdateUserRequest, ListUsersQuery, StatsResponse};
use crate::router::ApiState;

/// List all users.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = Vec<User>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_users(
    State(state): State<ApiState>,
    current: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .admin_service
        .list_users(&current.principal, query.skip, query.limit)
        .await?;
    Ok(Json(users))
}

/// Update a user's profile, role or active flag.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_user(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<User>> {
    request.validate()?;
    let updated = state
        .admin_service
        .update_user(&current.principal, id, request, &ctx)
        .await?;
    Ok(Json(updated))
}

/// Portal-wide counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_stats(
    State(state): State<ApiState>,
    current: CurrentUser,
) -> ApiResult<Json<StatsResponse>> {
    Ok(Json(state.admin_service.stats(&current.principal).await?))
}
