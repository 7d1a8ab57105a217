//! Self-service profile handlers.

use axum::{extract::State, Json};
use portal_db::User;
use validator::Validate;

use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::CurrentUser;
use crate::models::UpdateProfileRequest;
use crate::router::ApiState;

/// Get the caller's profile.
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Caller profile", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_profile(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

/// Update the caller's email and names. Role and active flag are not
/// self-service.
#[utoipa::path(
    put,
    path = "/users/profile",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid field value", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile(
    State(state): State<ApiState>,
    current: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    request.validate()?;
    let updated = state
        .user_service
        .update_profile(&current.user, request)
        .await?;
    Ok(Json(updated))
}
