//! Query models for audit endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Default and maximum page size for audit listings.
pub const MAX_AUDIT_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListAuditQuery {
    #[param(minimum = 0)]
    pub skip: Option<i64>,

    /// Maximum number of results (default: 100, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}
