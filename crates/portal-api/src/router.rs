//! Router configuration for the portal API.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use portal_api_auth::{admin_guard, approver_guard};
use sqlx::PgPool;

use crate::handlers::{access_requests, admin, audit, configuration, users};
use crate::models::PublicConfig;
use crate::services::{
    AccessRequestService, AdminService, AuditService, ConfigurationService, UserService,
};

/// Shared state for portal API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub access_request_service: Arc<AccessRequestService>,
    pub audit_service: Arc<AuditService>,
    pub user_service: Arc<UserService>,
    pub admin_service: Arc<AdminService>,
    pub configuration_service: Arc<ConfigurationService>,
    pub public_config: Arc<PublicConfig>,
}

impl ApiState {
    #[must_use]
    pub fn new(pool: PgPool, public_config: PublicConfig) -> Self {
        Self {
            access_request_service: Arc::new(AccessRequestService::new(pool.clone())),
            audit_service: Arc::new(AuditService::new(pool.clone())),
            user_service: Arc::new(UserService::new(pool.clone())),
            admin_service: Arc::new(AdminService::new(pool.clone())),
            configuration_service: Arc::new(ConfigurationService::new(pool.clone())),
            public_config: Arc::new(public_config),
            pool,
        }
    }
}

/// Create the authenticated portal router.
///
/// Callers must layer `jwt_auth_middleware` (and the `TokenVerifier`
/// extension) on top so that `PortalClaims` are present.
///
/// # Endpoints
///
/// - `GET/POST /requests` - Search and submit access requests
/// - `GET/PATCH /requests/:id` - View and edit one request
/// - `POST /requests/:id/approve` - Approve (approver or admin)
/// - `POST /requests/:id/reject` - Reject (approver or admin)
/// - `GET /audit/` - Audit trail
/// - `GET/PUT /users/profile` - Caller profile
/// - `/admin/*`, `/config/admin/*` - Admin only
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/requests",
            get(access_requests::search_requests).post(access_requests::create_request),
        )
        .route(
            "/requests/:id",
            get(access_requests::get_request).patch(access_requests::update_request),
        )
        .route("/audit", get(audit::list_audit_logs))
        .route("/audit/", get(audit::list_audit_logs))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .merge(decision_router())
        .merge(admin_router())
        .with_state(state)
}

/// Approve/reject routes, open to approvers and admins.
fn decision_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/requests/:id/approve",
            post(access_requests::approve_request),
        )
        .route("/requests/:id/reject", post(access_requests::reject_request))
        .layer(middleware::from_fn(approver_guard))
}

/// Admin-only routes, guarded before any handler runs.
fn admin_router() -> Router<ApiState> {
    Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", put(admin::update_user))
        .route("/admin/stats", get(admin::get_stats))
        .route("/config/admin", get(configuration::list_config))
        .route(
            "/config/admin/:key",
            put(configuration::upsert_config).delete(configuration::delete_config),
        )
        .layer(middleware::from_fn(admin_guard))
}

/// Create the unauthenticated router.
///
/// - `GET /config/public` - Branding and login settings
pub fn public_router(state: ApiState) -> Router {
    Router::new()
        .route("/config/public", get(configuration::get_public_config))
        .with_state(state)
}
