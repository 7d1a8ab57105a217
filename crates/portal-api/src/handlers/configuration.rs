//! Configuration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use portal_db::Configuration;
use validator::Validate;

use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::{CurrentUser, RequestContext};
use crate::models::{PublicConfig, UpsertConfigRequest};
use crate::router::ApiState;

/// Branding and login settings for the browser. No authentication.
#[utoipa::path(
    get,
    path = "/config/public",
    tag = "Configuration",
    responses((status = 200, description = "Public settings", body = PublicConfig))
)]
pub async fn get_public_config(State(state): State<ApiState>) -> Json<PublicConfig> {
    Json(state.public_config.as_ref().clone())
}

/// List configuration entries.
#[utoipa::path(
    get,
    path = "/config/admin",
    tag = "Configuration",
    responses(
        (status = 200, description = "Configuration entries", body = Vec<Configuration>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_config(
    State(state): State<ApiState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<Configuration>>> {
    Ok(Json(
        state
            .configuration_service
            .list(&current.principal)
            .await?,
    ))
}

/// Create or replace a configuration entry.
#[utoipa::path(
    put,
    path = "/config/admin/{key}",
    tag = "Configuration",
    params(("key" = String, Path, description = "Configuration key")),
    request_body = UpsertConfigRequest,
    responses(
        (status = 200, description = "Entry stored", body = Configuration),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn upsert_config(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(key): Path<String>,
    Json(request): Json<UpsertConfigRequest>,
) -> ApiResult<Json<Configuration>> {
    request.validate()?;
    let entry = state
        .configuration_service
        .upsert(&current.principal, &key, request, &ctx)
        .await?;
    Ok(Json(entry))
}

/// Delete a configuration entry.
#[utoipa::path(
    delete,
    path = "/config/admin/{key}",
    tag = "Configuration",
    params(("key" = String, Path, description = "Configuration key")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "No entry under this key", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_config(
    State(state): State<ApiState>,
    current: CurrentUser,
    ctx: RequestContext,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .configuration_service
        .delete(&current.principal, &key, &ctx)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
