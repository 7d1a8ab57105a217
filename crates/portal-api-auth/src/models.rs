//! Request and response bodies for the authentication endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use portal_auth::PortalClaims;

/// Authorization code to exchange for tokens.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenExchangeRequest {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,

    /// Must equal the redirect URI used in the authorization request.
    #[validate(length(min = 1, max = 2048))]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token must not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Token set returned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenSet {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_expires_in: i64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Identity carried by the caller's verified token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// Token subject.
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// Token issue time, seconds since the epoch.
    pub created_at: i64,
}

impl From<&PortalClaims> for MeResponse {
    fn from(claims: &PortalClaims) -> Self {
        Self {
            id: claims.sub.clone(),
            username: claims.preferred_username.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            roles: claims.all_roles().map(str::to_string).collect(),
            created_at: claims.iat,
        }
    }
}
