//! Access request handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::{CurrentUser, RequestContext};
use crate::models::{
    AccessRequestResponse, AccessRequestSearchResponse, ApproveAccessRequest,
    CreateAccessRequest, RejectAccessRequest, SearchRequestsQuery, UpdateAccessRequest,
    DEFAULT_SEARCH_LIMIT,
};
use crate::router::ApiState;

/// Submit a new access request.
#[utoipa::path(
    post,
    path = "/requests",
    tag = "Requests",
    request_body = CreateAccessRequest,
    responses(
        (status = 200, description = "Access request created", body = AccessRequestResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_request(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Json(request): Json<CreateAccessRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    request.validate()?;

    let created = state
        .access_request_service
        .submit(&current.principal, request, &ctx)
        .await?;

    Ok(Json(created.into()))
}

/// Search access requests visible to the caller.
#[utoipa::path(
    get,
    path = "/requests",
    tag = "Requests",
    params(SearchRequestsQuery),
    responses(
        (status = 200, description = "Matching access requests", body = AccessRequestSearchResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid paging parameters", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn search_requests(
    State(state): State<ApiState>,
    current: CurrentUser,
    Query(query): Query<SearchRequestsQuery>,
) -> ApiResult<Json<AccessRequestSearchResponse>> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let (requests, total) = state
        .access_request_service
        .search(&current.principal, query.query, query.status, skip, limit)
        .await?;

    Ok(Json(AccessRequestSearchResponse {
        requests: requests.into_iter().map(Into::into).collect(),
        total,
        page: skip / limit,
        page_size: limit,
    }))
}

/// Get one access request.
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    responses(
        (status = 200, description = "Access request details", body = AccessRequestResponse),
        (status = 403, description = "Neither owner nor admin", body = ErrorResponse),
        (status = 404, description = "Access request not found", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_request(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .access_request_service
        .get_request(&current.principal, id)
        .await?;
    Ok(Json(request.into()))
}

/// Edit an owned request that is still `created`.
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    request_body = UpdateAccessRequest,
    responses(
        (status = 200, description = "Access request updated", body = AccessRequestResponse),
        (status = 400, description = "Request is no longer editable", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Access request not found", body = ErrorResponse),
        (status = 422, description = "Invalid field value", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_request(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccessRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    request.validate()?;

    let updated = state
        .access_request_service
        .update(&current.principal, id, request, &ctx)
        .await?;

    Ok(Json(updated.into()))
}

/// Approve a pending access request.
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    request_body = ApproveAccessRequest,
    responses(
        (status = 200, description = "Access request approved", body = AccessRequestResponse),
        (status = 400, description = "Request already decided", body = ErrorResponse),
        (status = 403, description = "Approver or admin role required", body = ErrorResponse),
        (status = 404, description = "Access request not found", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn approve_request(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveAccessRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    request.validate()?;

    let approved = state
        .access_request_service
        .approve(&current.principal, id, request, &ctx)
        .await?;

    Ok(Json(approved.into()))
}

/// Reject a pending access request.
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    request_body = RejectAccessRequest,
    responses(
        (status = 200, description = "Access request rejected", body = AccessRequestResponse),
        (status = 400, description = "Request already decided", body = ErrorResponse),
        (status = 403, description = "Approver or admin role required", body = ErrorResponse),
        (status = 404, description = "Access request not found", body = ErrorResponse),
        (status = 422, description = "Missing rejection reason", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn reject_request(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectAccessRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    request.validate()?;

    let rejected = state
        .access_request_service
        .reject(&current.principal, id, request, &ctx)
        .await?;

    Ok(Json(rejected.into()))
}
