//! Role guard middleware.
//!
//! Both guards require `jwt_auth_middleware` to have run first and answer
//! 401 when no claims are present.

use crate::error::AuthApiError;
use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use portal_auth::PortalClaims;
use portal_core::Capability;

/// Require the admin capability.
///
/// # Usage
///
/// ```rust,ignore
/// use axum::{middleware, routing::get, Router};
/// use portal_api_auth::admin_guard;
///
/// let router = Router::new()
///     .route("/admin/stats", get(stats))
///     .layer(middleware::from_fn(admin_guard));
/// ```
pub async fn admin_guard(request: Request<Body>, next: Next) -> Result<Response, AuthApiError> {
    require_any(&request, &[Capability::Admin], "admin role required")?;
    Ok(next.run(request).await)
}

/// Require the approver or admin capability.
pub async fn approver_guard(request: Request<Body>, next: Next) -> Result<Response, AuthApiError> {
    require_any(
        &request,
        &[Capability::Approver, Capability::Admin],
        "approver or admin role required",
    )?;
    Ok(next.run(request).await)
}

fn require_any(
    request: &Request<Body>,
    allowed: &[Capability],
    denial: &str,
) -> Result<(), AuthApiError> {
    let claims = request
        .extensions()
        .get::<PortalClaims>()
        .ok_or_else(|| AuthApiError::Unauthorized("Missing authentication".to_string()))?;

    let capabilities = claims.capabilities();
    if !capabilities.iter().any(|c| allowed.contains(c)) {
        tracing::warn!(
            user_id = %claims.sub,
            roles = ?capabilities,
            "Access denied: {}",
            denial
        );
        return Err(AuthApiError::Forbidden(format!("Access denied: {denial}")));
    }

    tracing::debug!(user_id = %claims.sub, "Role check passed");
    Ok(())
}
