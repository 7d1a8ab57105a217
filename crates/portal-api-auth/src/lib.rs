//! Authentication surface of the access portal.
//!
//! - `jwt_auth_middleware` verifies bearer tokens and stores the claims in
//!   request extensions.
//! - `admin_guard` / `approver_guard` gate routes on the caller's roles.
//! - `/auth/token`, `/auth/refresh` and `/auth/logout` relay OAuth2 calls to
//!   the identity provider so the client secret never reaches the browser.
//! - `/me` echoes the verified token's identity.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{middleware, Extension, Router};
//! use portal_api_auth::{auth_router, jwt_auth_middleware, me_router, AuthState};
//!
//! let app = Router::new()
//!     .merge(auth_router(auth_state))
//!     .merge(me_router().layer(middleware::from_fn(jwt_auth_middleware)))
//!     .layer(Extension(verifier));
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use error::{AuthApiError, ErrorResponse};
pub use middleware::{admin_guard, approver_guard, jwt_auth_middleware};
pub use models::{
    LogoutRequest, MeResponse, MessageResponse, RefreshRequest, TokenExchangeRequest, TokenSet,
};
pub use router::{auth_router, me_router, AuthState};
pub use services::{IdpClient, IdpSettings};
