//! GET /me - identity of the verified token.

use axum::{Extension, Json};
use portal_auth::PortalClaims;

use crate::error::ErrorResponse;
use crate::models::MeResponse;

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearerAuth" = [])),
    tag = "Auth"
)]
pub async fn me_handler(Extension(claims): Extension<PortalClaims>) -> Json<MeResponse> {
    Json(MeResponse::from(&claims))
}
