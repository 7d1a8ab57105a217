//! Authentication and authorization middleware.

pub mod jwt_auth;
pub mod role_guard;

pub use jwt_auth::jwt_auth_middleware;
pub use role_guard::{admin_guard, approver_guard};
