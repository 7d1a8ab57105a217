//! Principal resolution and self-service profile.

use portal_auth::PortalClaims;
use portal_core::{Capability, PortalError, Principal};
use portal_db::{
    is_unique_violation, UpdateUser, UpsertUser, User, UserRole, EMAIL_CONSTRAINT,
    USERNAME_CONSTRAINT,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::UpdateProfileRequest;

/// Service for user lookup and profile maintenance.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve verified claims to the caller's user row and capabilities,
    /// creating the user on first sight.
    ///
    /// Capabilities always come from the token; the stored role is only
    /// recorded at creation time.
    pub async fn resolve(&self, claims: &PortalClaims) -> ApiResult<(User, Principal)> {
        let username = claims
            .preferred_username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| PortalError::Unauthenticated {
                message: Some("Token carries no username".to_string()),
            })?;

        // The row id is only known after the upsert.
        let mut principal =
            Principal::new(Uuid::nil(), &claims.sub, username, claims.capabilities());

        let user = User::get_or_create(
            &self.pool,
            &UpsertUser {
                subject_id: claims.sub.clone(),
                username: username.to_string(),
                email: claims.email.clone(),
                first_name: claims.given_name.clone(),
                last_name: claims.family_name.clone(),
                role: role_for(principal.highest_capability()),
            },
        )
        .await
        .map_err(map_user_conflict)?;

        if !user.is_active {
            tracing::warn!(user_id = %user.id, sub = %claims.sub, "Rejected inactive user");
            return Err(PortalError::Forbidden("User account is disabled".to_string()).into());
        }

        principal.user_id = user.id;
        principal.username.clone_from(&user.username);
        Ok((user, principal))
    }

    /// Update the caller's own email and names.
    pub async fn update_profile(
        &self,
        user: &User,
        input: UpdateProfileRequest,
    ) -> ApiResult<User> {
        let changes = UpdateUser {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            ..Default::default()
        };

        let updated = User::update(&self.pool, user.id, &changes)
            .await
            .map_err(map_user_conflict)?
            .ok_or_else(|| PortalError::not_found("User", user.id))?;

        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }
}

/// Stored role for a capability.
#[must_use]
pub fn role_for(capability: Capability) -> UserRole {
    match capability {
        Capability::Admin => UserRole::Admin,
        Capability::Approver => UserRole::Approver,
        Capability::User => UserRole::User,
    }
}

/// Turn a clash on a unique user column into a validation error on that
/// field. Other errors pass through unchanged.
pub(crate) fn map_user_conflict(err: sqlx::Error) -> ApiError {
    if is_unique_violation(&err, EMAIL_CONSTRAINT) {
        PortalError::validation("email", "Email address is already in use").into()
    } else if is_unique_violation(&err, USERNAME_CONSTRAINT) {
        PortalError::validation("username", "Username is already taken").into()
    } else {
        err.into()
    }
}
