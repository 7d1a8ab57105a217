//! User administration and portal statistics.

use portal_core::{PortalError, Principal};
use portal_db::{
    AccessRequest, AccessRequestFilter, AccessRequestStatus, AuditAction, AuditResourceType,
    UpdateUser, User,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extractors::RequestContext;
use crate::models::{AdminUpdateUserRequest, StatsResponse, DEFAULT_USER_LIMIT, MAX_USER_LIMIT};
use crate::services::audit_service::AuditRecord;
use crate::services::user_service::map_user_conflict;

/// Statuses counted as awaiting a decision.
const PENDING_STATUSES: [AccessRequestStatus; 2] = [
    AccessRequestStatus::Created,
    AccessRequestStatus::PendingApproval,
];

/// Service for admin-only operations. Every method re-checks the admin
/// capability.
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_users(
        &self,
        principal: &Principal,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> ApiResult<Vec<User>> {
        principal.require_admin()?;
        let limit = limit.unwrap_or(DEFAULT_USER_LIMIT).clamp(1, MAX_USER_LIMIT);
        let offset = skip.unwrap_or(0).max(0);
        Ok(User::list(&self.pool, limit, offset).await?)
    }

    /// Update any user's profile, role or active flag.
    pub async fn update_user(
        &self,
        principal: &Principal,
        id: Uuid,
        input: AdminUpdateUserRequest,
        ctx: &RequestContext,
    ) -> ApiResult<User> {
        principal.require_admin()?;

        let changes = UpdateUser {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            is_active: input.is_active,
        };

        let mut tx = self.pool.begin().await?;

        let current = User::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| PortalError::not_found("User", id))?;
        let updated = User::update(&mut *tx, id, &changes)
            .await
            .map_err(map_user_conflict)?
            .ok_or_else(|| PortalError::not_found("User", id))?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::UserUpdated,
            AuditResourceType::User,
            updated.id.to_string(),
        )
        .details(format!("Updated user {}", updated.username))
        .old_value(&current)?
        .new_value(&updated)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %updated.id,
            admin_id = %principal.user_id,
            role = %updated.role,
            is_active = updated.is_active,
            "User updated by admin"
        );

        Ok(updated)
    }

    pub async fn stats(&self, principal: &Principal) -> ApiResult<StatsResponse> {
        principal.require_admin()?;

        let total_users = User::count(&self.pool).await?;
        let total_requests =
            AccessRequest::count(&self.pool, &AccessRequestFilter::default()).await?;
        let pending_requests =
            AccessRequest::count_in_statuses(&self.pool, &PENDING_STATUSES).await?;
        let approved_requests =
            AccessRequest::count_in_statuses(&self.pool, &[AccessRequestStatus::Approved]).await?;
        let rejected_requests =
            AccessRequest::count_in_statuses(&self.pool, &[AccessRequestStatus::Rejected]).await?;

        Ok(StatsResponse {
            total_users,
            total_requests,
            pending_requests,
            approved_requests,
            rejected_requests,
        })
    }
}
