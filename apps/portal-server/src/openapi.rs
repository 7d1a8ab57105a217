//! `OpenAPI` documentation and Swagger UI configuration.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::HealthResponse;

/// Security scheme modifier for Bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// `OpenAPI` documentation for the portal API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Network Access Portal API",
        description = "Network access requests with role-based approval and a full audit trail"
    ),
    paths(
        crate::handlers::health::health_handler,
        portal_api_auth::handlers::token::exchange_token_handler,
        portal_api_auth::handlers::token::refresh_token_handler,
        portal_api_auth::handlers::token::logout_handler,
        portal_api_auth::handlers::me::me_handler,
        portal_api::handlers::access_requests::create_request,
        portal_api::handlers::access_requests::search_requests,
        portal_api::handlers::access_requests::get_request,
        portal_api::handlers::access_requests::update_request,
        portal_api::handlers::access_requests::approve_request,
        portal_api::handlers::access_requests::reject_request,
        portal_api::handlers::audit::list_audit_logs,
        portal_api::handlers::users::get_profile,
        portal_api::handlers::users::update_profile,
        portal_api::handlers::admin::list_users,
        portal_api::handlers::admin::update_user,
        portal_api::handlers::admin::get_stats,
        portal_api::handlers::configuration::get_public_config,
        portal_api::handlers::configuration::list_config,
        portal_api::handlers::configuration::upsert_config,
        portal_api::handlers::configuration::delete_config,
    ),
    components(schemas(
        HealthResponse,
        portal_api::ErrorResponse,
        portal_api::models::CreateAccessRequest,
        portal_api::models::UpdateAccessRequest,
        portal_api::models::ApproveAccessRequest,
        portal_api::models::RejectAccessRequest,
        portal_api::models::AccessRequestResponse,
        portal_api::models::AccessRequestSearchResponse,
        portal_api::models::UpdateProfileRequest,
        portal_api::models::AdminUpdateUserRequest,
        portal_api::models::StatsResponse,
        portal_api::models::PublicConfig,
        portal_api::models::UpsertConfigRequest,
        portal_api_auth::TokenExchangeRequest,
        portal_api_auth::RefreshRequest,
        portal_api_auth::LogoutRequest,
        portal_api_auth::TokenSet,
        portal_api_auth::MessageResponse,
        portal_api_auth::MeResponse,
        portal_db::User,
        portal_db::UserRole,
        portal_db::AuditLog,
        portal_db::Configuration,
        portal_db::AccessRequestStatus,
        portal_db::NetworkProtocol,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Token exchange with the identity provider"),
        (name = "Requests", description = "Network access request lifecycle"),
        (name = "Audit", description = "Audit trail"),
        (name = "Users", description = "Self-service profile"),
        (name = "Admin", description = "User administration and statistics"),
        (name = "Configuration", description = "Public and admin settings"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, document at `/openapi.json`.
pub fn swagger_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}
