//! OAuth2 passthrough handlers.
//!
//! POST /auth/token   - exchange an authorization code
//! POST /auth/refresh - refresh an access token
//! POST /auth/logout  - revoke a refresh token

use std::sync::Arc;

use axum::{Extension, Json};
use validator::Validate;

use crate::error::{ApiResult, ErrorResponse};
use crate::models::{LogoutRequest, MessageResponse, RefreshRequest, TokenExchangeRequest, TokenSet};
use crate::services::{IdpClient, RevokeOutcome};

/// Exchange an authorization code for tokens.
///
/// The client secret stays on the server; the browser only ever sees the
/// resulting tokens.
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TokenExchangeRequest,
    responses(
        (status = 200, description = "Token set issued", body = TokenSet),
        (status = 401, description = "Code rejected by the identity provider", body = ErrorResponse),
        (status = 503, description = "Identity provider unavailable", body = ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn exchange_token_handler(
    Extension(idp): Extension<Arc<IdpClient>>,
    Json(request): Json<TokenExchangeRequest>,
) -> ApiResult<Json<TokenSet>> {
    request.validate()?;
    let tokens = idp
        .exchange_code(&request.code, &request.redirect_uri)
        .await?;
    Ok(Json(tokens))
}

/// Obtain a new token set with a refresh token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token set refreshed", body = TokenSet),
        (status = 401, description = "Refresh token expired or invalid", body = ErrorResponse),
        (status = 503, description = "Identity provider unavailable", body = ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn refresh_token_handler(
    Extension(idp): Extension<Arc<IdpClient>>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<TokenSet>> {
    request.validate()?;
    let tokens = idp.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// Revoke the refresh token. Always answers 200.
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logout processed", body = MessageResponse),
    ),
    tag = "Auth"
)]
pub async fn logout_handler(
    Extension(idp): Extension<Arc<IdpClient>>,
    Json(request): Json<LogoutRequest>,
) -> Json<MessageResponse> {
    let message = match idp.revoke(&request.refresh_token).await {
        RevokeOutcome::Revoked => "Logged out successfully",
        RevokeOutcome::Refused => "Logout request processed",
        RevokeOutcome::Failed => "Logout processed",
    };
    Json(MessageResponse::new(message))
}
