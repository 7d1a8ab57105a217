//! Bearer token authentication middleware.
//!
//! Verifies the token from the `Authorization` header with the
//! `TokenVerifier` found in request extensions, then inserts the verified
//! `PortalClaims` for downstream extractors and guards.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use portal_auth::TokenVerifier;

/// Bearer token authentication middleware.
///
/// # Usage
///
/// ```rust,ignore
/// use axum::{middleware, routing::get, Extension, Router};
/// use portal_api_auth::jwt_auth_middleware;
///
/// let router = Router::new()
///     .route("/me", get(get_me))
///     .layer(middleware::from_fn(jwt_auth_middleware))
///     .layer(Extension(verifier));
/// ```
pub async fn jwt_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let verifier = request
        .extensions()
        .get::<TokenVerifier>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("Token verifier not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            )
                .into_response()
        })?;

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format",
        )
            .into_response()
    })?;

    if token.is_empty() {
        tracing::warn!("Rejected empty bearer token");
        return Err((StatusCode::UNAUTHORIZED, "Empty bearer token").into_response());
    }

    let claims = verifier.verify(token).await.map_err(|e| {
        if e.is_key_error() {
            tracing::error!(error = %e, "Token verification keys unavailable");
        } else {
            tracing::warn!(error = %e, "Token validation failed");
        }
        (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
    })?;

    tracing::debug!(sub = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use portal_auth::test_keys::{tamper_signature, TEST_KID, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
    use portal_auth::{encode_token_with_kid, PortalClaims, ValidationConfig};
    use tower::ServiceExt;

    async fn echo_subject(Extension(claims): Extension<PortalClaims>) -> String {
        claims.sub
    }

    fn app() -> Router {
        let verifier =
            TokenVerifier::from_public_key_pem(TEST_PUBLIC_KEY, ValidationConfig::default())
                .unwrap();
        Router::new()
            .route("/", get(echo_subject))
            .layer(middleware::from_fn(jwt_auth_middleware))
            .layer(Extension(verifier))
    }

    fn token(claims: &PortalClaims) -> String {
        encode_token_with_kid(claims, TEST_PRIVATE_KEY, TEST_KID).unwrap()
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_inserts_claims() {
        let claims = PortalClaims::builder()
            .subject("user-123")
            .username("alice")
            .build();
        let response = app()
            .oneshot(request(Some(&format!("Bearer {}", token(&claims)))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"user-123");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let response = app().oneshot(request(Some("Basic abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthorized() {
        let response = app().oneshot(request(Some("Bearer "))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let claims = PortalClaims::builder()
            .subject("user-123")
            .expires_in_secs(-3600)
            .build();
        let response = app()
            .oneshot(request(Some(&format!("Bearer {}", token(&claims)))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_token_is_unauthorized() {
        let claims = PortalClaims::builder().subject("user-123").build();
        let forged = tamper_signature(&token(&claims));
        let response = app()
            .oneshot(request(Some(&format!("Bearer {forged}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_verifier_is_server_error() {
        let app = Router::new()
            .route("/", get(echo_subject))
            .layer(middleware::from_fn(jwt_auth_middleware));
        let response = app
            .oneshot(request(Some("Bearer abc.def.ghi")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
