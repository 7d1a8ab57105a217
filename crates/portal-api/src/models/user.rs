//! Request and response models for profile and administration endpoints.

use portal_db::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Default page size for user listings.
pub const DEFAULT_USER_LIMIT: i64 = 100;

/// Maximum page size for user listings.
pub const MAX_USER_LIMIT: i64 = 100;

/// Self-service profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 255))]
    pub first_name: Option<String>,

    #[validate(length(max = 255))]
    pub last_name: Option<String>,
}

/// Admin update of any user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 255))]
    pub first_name: Option<String>,

    #[validate(length(max = 255))]
    pub last_name: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    #[param(minimum = 0)]
    pub skip: Option<i64>,

    /// Maximum number of results (default: 100, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

/// Portal-wide counters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_requests: i64,
    /// Requests awaiting a decision.
    pub pending_requests: i64,
    pub approved_requests: i64,
    pub rejected_requests: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_rejects_bad_email() {
        let body = UpdateProfileRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_profile_update_ignores_role_fields() {
        let body: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "role": "admin",
            "is_active": false
        }))
        .unwrap();
        assert_eq!(body.first_name.as_deref(), Some("Ada"));
        assert!(body.validate().is_ok());
    }
}
