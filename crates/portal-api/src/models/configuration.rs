//! Models for configuration endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Settings safe to expose before login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicConfig {
    pub app_title: String,
    pub app_logo_url: String,
    pub app_theme_color: String,
    /// Identity provider base URL.
    pub auth_server_url: String,
    pub auth_realm: String,
    /// Public client id used by the browser for the authorization redirect.
    pub auth_client_id: String,
}

/// Upsert of a configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertConfigRequest {
    #[validate(length(max = 10000))]
    pub value: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}
