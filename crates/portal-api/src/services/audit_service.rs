//! Audit trail recording and listing.
//!
//! Entries are written with the same executor as the change they document,
//! so both commit or roll back together.

use portal_core::Principal;
use portal_db::{AuditAction, AuditLog, AuditResourceType, NewAuditLog};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extractors::RequestContext;
use crate::models::MAX_AUDIT_LIMIT;

/// Builder for one audit entry.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    entry: NewAuditLog,
}

impl AuditRecord {
    pub fn new(
        actor: &Principal,
        ctx: &RequestContext,
        action: AuditAction,
        resource_type: AuditResourceType,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            entry: NewAuditLog {
                user_id: actor.user_id,
                access_request_id: None,
                action,
                resource_type,
                resource_id: resource_id.into(),
                old_value: None,
                new_value: None,
                details: String::new(),
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone(),
            },
        }
    }

    /// Tie the entry to an access request; deleting the request removes it.
    #[must_use]
    pub fn access_request(mut self, id: Uuid) -> Self {
        self.entry.access_request_id = Some(id);
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.entry.details = details.into();
        self
    }

    /// Snapshot before the change.
    pub fn old_value<T: Serialize>(mut self, value: &T) -> ApiResult<Self> {
        self.entry.old_value = Some(snapshot(value)?);
        Ok(self)
    }

    /// Snapshot after the change.
    pub fn new_value<T: Serialize>(mut self, value: &T) -> ApiResult<Self> {
        self.entry.new_value = Some(snapshot(value)?);
        Ok(self)
    }

    /// Append the entry.
    pub async fn write<'e, E>(self, executor: E) -> ApiResult<AuditLog>
    where
        E: PgExecutor<'e>,
    {
        let log = AuditLog::create(executor, &self.entry).await?;
        tracing::info!(
            audit_id = %log.id,
            user_id = %log.user_id,
            action = %log.action,
            resource_type = %log.resource_type,
            resource_id = %log.resource_id,
            "Audit entry recorded"
        );
        Ok(log)
    }
}

fn snapshot<T: Serialize>(value: &T) -> ApiResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize audit snapshot: {e}")))
}

/// Read access to the audit trail.
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List entries newest first. Admins see every entry, everyone else
    /// only the entries they performed.
    pub async fn list(
        &self,
        principal: &Principal,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> ApiResult<Vec<AuditLog>> {
        let limit = limit.unwrap_or(MAX_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
        let offset = skip.unwrap_or(0).max(0);

        let logs = AuditLog::list(&self.pool, principal.audit_scope(), limit, offset).await?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::Capability;

    #[test]
    fn test_record_builder_fills_entry() {
        let actor = Principal::new(Uuid::new_v4(), "sub", "alice", [Capability::User]);
        let ctx = RequestContext::new("10.1.1.1", "curl/8");
        let request_id = Uuid::new_v4();

        let record = AuditRecord::new(
            &actor,
            &ctx,
            AuditAction::Rejected,
            AuditResourceType::AccessRequest,
            "REQ-20240101-ABCDEF12",
        )
        .access_request(request_id)
        .details("Rejected access request: policy violation")
        .new_value(&serde_json::json!({"status": "rejected"}))
        .unwrap();

        assert_eq!(record.entry.user_id, actor.user_id);
        assert_eq!(record.entry.access_request_id, Some(request_id));
        assert_eq!(record.entry.ip_address, "10.1.1.1");
        assert_eq!(record.entry.user_agent, "curl/8");
        assert!(record.entry.details.contains("policy violation"));
        assert!(record.entry.old_value.is_none());
        assert_eq!(record.entry.new_value.unwrap()["status"], "rejected");
    }
}
