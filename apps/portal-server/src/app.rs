//! Router assembly.

use std::time::Duration;

use axum::{middleware, routing::get, Extension, Router};
use portal_api::{api_router, public_router, ApiState};
use portal_api_auth::{auth_router, jwt_auth_middleware, me_router, AuthState, IdpClient};
use portal_auth::TokenVerifier;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{health_handler, root_handler};
use crate::openapi::swagger_routes;

/// Build the full application router.
///
/// Unauthenticated: `/`, `/health`, `/docs`, `/config/public`, `/auth/*`.
/// Everything else passes through `jwt_auth_middleware`.
pub fn build_router(
    config: &Config,
    pool: PgPool,
    verifier: TokenVerifier,
    idp_client: IdpClient,
) -> Router {
    let api_state = ApiState::new(pool, config.public_config());
    let auth_state = AuthState::new(idp_client);

    let protected = api_router(api_state.clone())
        .merge(me_router())
        .layer(middleware::from_fn(jwt_auth_middleware));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(public_router(api_state))
        .merge(auth_router(auth_state))
        .merge(protected)
        .merge(swagger_routes())
        .layer(Extension(verifier))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_origins))
}

/// Build the CORS layer from configured origins.
///
/// Credentials are allowed only with an explicit origin list.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.iter().any(|o| o == "*");

    let layer = CorsLayer::new().max_age(Duration::from_secs(3600));

    if is_wildcard {
        return layer
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any);
    }

    use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
    use axum::http::{HeaderValue, Method};

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN])
        .allow_credentials(true)
}
