//! Audit log model.
//!
//! Append-only record of every state-changing action. The table refuses
//! updates; rows disappear only when the access request they document is
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Approved,
    Rejected,
    UserUpdated,
    ConfigUpdated,
    ConfigDeleted,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Approved => "approved",
            AuditAction::Rejected => "rejected",
            AuditAction::UserUpdated => "user_updated",
            AuditAction::ConfigUpdated => "config_updated",
            AuditAction::ConfigDeleted => "config_deleted",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(AuditAction::Created),
            "updated" => Ok(AuditAction::Updated),
            "approved" => Ok(AuditAction::Approved),
            "rejected" => Ok(AuditAction::Rejected),
            "user_updated" => Ok(AuditAction::UserUpdated),
            "config_updated" => Ok(AuditAction::ConfigUpdated),
            "config_deleted" => Ok(AuditAction::ConfigDeleted),
            _ => Err(format!("Invalid audit action: {s}")),
        }
    }
}

/// Kind of resource an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResourceType {
    AccessRequest,
    User,
    Configuration,
}

impl AuditResourceType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResourceType::AccessRequest => "access_request",
            AuditResourceType::User => "user",
            AuditResourceType::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for AuditResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored audit entry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditLog {
    pub id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    pub access_request_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub old_value: Option<JsonValue>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub new_value: Option<JsonValue>,
    pub details: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Uuid,
    pub access_request_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_type: AuditResourceType,
    pub resource_id: String,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub details: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl AuditLog {
    #[must_use]
    pub fn action_enum(&self) -> Option<AuditAction> {
        self.action.parse().ok()
    }

    /// Append an entry.
    pub async fn create<'e, E>(executor: E, input: &NewAuditLog) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO audit_logs
                (user_id, access_request_id, action, resource_type, resource_id,
                 old_value, new_value, details, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            ",
        )
        .bind(input.user_id)
        .bind(input.access_request_id)
        .bind(input.action.as_str())
        .bind(input.resource_type.as_str())
        .bind(&input.resource_id)
        .bind(&input.old_value)
        .bind(&input.new_value)
        .bind(&input.details)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(executor)
        .await
    }

    /// List entries newest first, optionally only those by `acting_user`.
    pub async fn list<'e, E>(
        executor: E,
        acting_user: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM audit_logs
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(acting_user)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
    }

    pub async fn count<'e, E>(executor: E, acting_user: Option<Uuid>) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE ($1::uuid IS NULL OR user_id = $1)")
            .bind(acting_user)
            .fetch_one(executor)
            .await
    }

    /// All entries documenting one access request, oldest first.
    pub async fn list_for_request<'e, E>(
        executor: E,
        access_request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM audit_logs
            WHERE access_request_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(access_request_id)
        .fetch_all(executor)
        .await
    }
}
