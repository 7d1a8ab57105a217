//! Router configuration for the authentication endpoints.
//!
//! - POST /auth/token
//! - POST /auth/refresh
//! - POST /auth/logout
//! - GET /me (requires `jwt_auth_middleware`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::handlers::{exchange_token_handler, logout_handler, me_handler, refresh_token_handler};
use crate::services::IdpClient;

/// Shared state for the authentication routes.
#[derive(Clone)]
pub struct AuthState {
    pub idp: Arc<IdpClient>,
}

impl AuthState {
    #[must_use]
    pub fn new(idp: IdpClient) -> Self {
        Self { idp: Arc::new(idp) }
    }
}

/// Unauthenticated OAuth2 passthrough routes.
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/token", post(exchange_token_handler))
        .route("/auth/refresh", post(refresh_token_handler))
        .route("/auth/logout", post(logout_handler))
        .layer(Extension(state.idp))
}

/// Identity echo route. The caller layers authentication on top.
pub fn me_router() -> Router {
    Router::new().route("/me", get(me_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::IdpSettings;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
    };
    use portal_auth::test_keys::{TEST_KID, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
    use portal_auth::{encode_token_with_kid, PortalClaims, TokenVerifier, ValidationConfig};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(server_url: &str) -> AuthState {
        AuthState::new(IdpClient::new(IdpSettings {
            server_url: server_url.to_string(),
            realm: "portal".to_string(),
            client_id: "portal-backend".to_string(),
            client_secret: "s3cret".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap())
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_token_exchange_relays_token_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "a",
                "expires_in": 300,
                "refresh_expires_in": 1800,
                "token_type": "Bearer",
                "scope": "openid",
                "refresh_token": "r"
            })))
            .mount(&server)
            .await;

        let response = auth_router(state(&server.uri()))
            .oneshot(json_post(
                "/auth/token",
                serde_json::json!({"code": "abc", "redirect_uri": "http://localhost:3000/cb"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["access_token"], "a");
        assert_eq!(body["refresh_token"], "r");
    }

    #[tokio::test]
    async fn test_token_exchange_rejected_is_401() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Code not valid"
            })))
            .mount(&server)
            .await;

        let response = auth_router(state(&server.uri()))
            .oneshot(json_post(
                "/auth/token",
                serde_json::json!({"code": "abc", "redirect_uri": "http://localhost:3000/cb"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert!(body["message"].as_str().unwrap().contains("Code not valid"));
    }

    #[tokio::test]
    async fn test_refresh_unreachable_is_503() {
        let response = auth_router(state("http://127.0.0.1:1"))
            .oneshot(json_post(
                "/auth/refresh",
                serde_json::json!({"refresh_token": "r"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_logout_always_succeeds() {
        let response = auth_router(state("http://127.0.0.1:1"))
            .oneshot(json_post(
                "/auth/logout",
                serde_json::json!({"refresh_token": "r"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Logout processed");
    }

    #[tokio::test]
    async fn test_me_returns_token_identity() {
        let verifier =
            TokenVerifier::from_public_key_pem(TEST_PUBLIC_KEY, ValidationConfig::default())
                .unwrap();
        let app = me_router()
            .layer(middleware::from_fn(crate::middleware::jwt_auth_middleware))
            .layer(Extension(verifier));

        let claims = PortalClaims::builder()
            .subject("sub-42")
            .username("alice")
            .email("alice@example.com")
            .roles(vec!["approver"])
            .issued_at(1_700_000_000)
            .build();
        let token = encode_token_with_kid(&claims, TEST_PRIVATE_KEY, TEST_KID).unwrap();

        let request = Request::builder()
            .uri("/me")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "sub-42");
        assert_eq!(body["username"], "alice");
        assert_eq!(body["roles"], serde_json::json!(["approver"]));
        assert_eq!(body["created_at"], 1_700_000_000);
    }

    #[tokio::test]
    async fn test_me_without_token_is_401() {
        let verifier =
            TokenVerifier::from_public_key_pem(TEST_PUBLIC_KEY, ValidationConfig::default())
                .unwrap();
        let app = me_router()
            .layer(middleware::from_fn(crate::middleware::jwt_auth_middleware))
            .layer(Extension(verifier));

        let request = Request::builder().uri("/me").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
