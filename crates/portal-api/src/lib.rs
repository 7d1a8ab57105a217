//! Network access request portal API.
//!
//! Users submit requests to open network access (source, destination,
//! port, protocol); approvers and admins approve or reject them. Every
//! change is written to an audit trail in the same transaction.
//!
//! # Endpoints
//!
//! - `/requests` - Access request lifecycle
//! - `/audit/` - Audit trail
//! - `/users/profile` - Self-service profile
//! - `/admin/*` - User administration and statistics
//! - `/config/*` - Public and admin configuration

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extractors::{CurrentUser, RequestContext};
pub use models::PublicConfig;
pub use router::{api_router, public_router, ApiState};
