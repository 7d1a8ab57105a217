//! Network access request model.
//!
//! A request asks for a network path (source, destination, port, protocol)
//! to be opened. Status moves `created` → `pending_approval` → `approved`,
//! or `created` → `rejected`. `closed` exists in the schema but no portal
//! operation enters it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Name of the unique constraint on `request_number`.
pub const REQUEST_NUMBER_CONSTRAINT: &str = "access_requests_request_number_key";

/// Lifecycle status of an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessRequestStatus {
    /// Submitted, editable by the owner, awaiting a decision.
    Created,
    /// Transient step on the way to `approved`.
    PendingApproval,
    Approved,
    Rejected,
    /// Reserved.
    Closed,
}

impl AccessRequestStatus {
    /// Whether the owner may still edit the request.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Whether an approver may still approve or reject the request.
    #[must_use]
    pub fn is_decidable(&self) -> bool {
        matches!(self, Self::Created)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for AccessRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested network protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(type_name = "network_protocol", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NetworkProtocol {
    #[default]
    Tcp,
    Udp,
    Icmp,
    Ssh,
    Https,
    Http,
    Custom,
}

/// A network access request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: Uuid,

    /// Human-readable number, `REQ-YYYYMMDD-XXXXXXXX`.
    pub request_number: String,

    /// Owner (the submitting user).
    pub user_id: Uuid,

    /// Set when the request is approved or rejected.
    pub approver_id: Option<Uuid>,

    pub source_ip: String,
    pub destination_ip: String,
    pub destination_hostname: Option<String>,
    pub port: i32,
    pub protocol: NetworkProtocol,
    pub description: String,
    pub business_justification: String,
    pub status: AccessRequestStatus,
    pub approval_comment: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Input for inserting a request. Fields are already validated.
#[derive(Debug, Clone)]
pub struct NewAccessRequest {
    pub request_number: String,
    pub user_id: Uuid,
    pub source_ip: String,
    pub destination_ip: String,
    pub destination_hostname: Option<String>,
    pub port: i32,
    pub protocol: NetworkProtocol,
    pub description: String,
    pub business_justification: String,
}

/// Owner-editable fields. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessRequestChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<NetworkProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_justification: Option<String>,
}

/// Filter options for searching requests.
#[derive(Debug, Clone, Default)]
pub struct AccessRequestFilter {
    /// Restrict to requests owned by this user.
    pub owner_id: Option<Uuid>,
    pub status: Option<AccessRequestStatus>,
    /// Case-insensitive substring of request number, source or destination IP.
    pub query: Option<String>,
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl AccessRequestFilter {
    /// Append the filter's conditions, numbering parameters from
    /// `param_count + 1`. Returns the last parameter number used.
    fn push_conditions(&self, query: &mut String, mut param_count: usize) -> usize {
        if self.owner_id.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if self.status.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND status = ${param_count}"));
        }
        if self.query.is_some() {
            param_count += 1;
            query.push_str(&format!(
                " AND (request_number ILIKE ${param_count} \
                 OR source_ip ILIKE ${param_count} \
                 OR destination_ip ILIKE ${param_count})"
            ));
        }
        param_count
    }

    fn like_pattern(&self) -> Option<String> {
        self.query.as_deref().map(|q| format!("%{}%", escape_like(q)))
    }
}

impl AccessRequest {
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM access_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a request with a row-level lock held until the surrounding
    /// transaction ends. Serializes concurrent decisions on one request.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            SELECT * FROM access_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Insert a new request in status `created`.
    pub async fn insert<'e, E>(executor: E, input: &NewAccessRequest) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            INSERT INTO access_requests (
                request_number, user_id, source_ip, destination_ip,
                destination_hostname, port, protocol, description,
                business_justification, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'created')
            RETURNING *
            "#,
        )
        .bind(&input.request_number)
        .bind(input.user_id)
        .bind(&input.source_ip)
        .bind(&input.destination_ip)
        .bind(&input.destination_hostname)
        .bind(input.port)
        .bind(input.protocol)
        .bind(&input.description)
        .bind(&input.business_justification)
        .fetch_one(executor)
        .await
    }

    /// Apply owner edits and bump `updated_at`.
    pub async fn apply_changes<'e, E>(
        executor: E,
        id: Uuid,
        changes: &AccessRequestChanges,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            UPDATE access_requests SET
                destination_ip = COALESCE($2, destination_ip),
                destination_hostname = COALESCE($3, destination_hostname),
                port = COALESCE($4, port),
                protocol = COALESCE($5, protocol),
                description = COALESCE($6, description),
                business_justification = COALESCE($7, business_justification),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.destination_ip)
        .bind(&changes.destination_hostname)
        .bind(changes.port)
        .bind(changes.protocol)
        .bind(&changes.description)
        .bind(&changes.business_justification)
        .fetch_one(executor)
        .await
    }

    /// Move to `pending_approval`.
    pub async fn mark_pending_approval<'e, E>(executor: E, id: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            UPDATE access_requests
            SET status = 'pending_approval', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Record an approval: status `approved`, approver, comment, `approved_at`.
    pub async fn record_approval<'e, E>(
        executor: E,
        id: Uuid,
        approver_id: Uuid,
        comment: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            UPDATE access_requests SET
                status = 'approved',
                approver_id = $2,
                approval_comment = $3,
                approved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(comment)
        .fetch_one(executor)
        .await
    }

    /// Record a rejection: status `rejected`, approver, reason, `rejected_at`.
    pub async fn record_rejection<'e, E>(
        executor: E,
        id: Uuid,
        approver_id: Uuid,
        reason: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            UPDATE access_requests SET
                status = 'rejected',
                approver_id = $2,
                rejection_reason = $3,
                rejected_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(reason)
        .fetch_one(executor)
        .await
    }

    /// Search requests, newest first.
    pub async fn search<'e, E>(
        executor: E,
        filter: &AccessRequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("SELECT * FROM access_requests WHERE TRUE");
        let param_count = filter.push_conditions(&mut query, 0);
        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        ));

        let mut q = sqlx::query_as::<_, AccessRequest>(&query);

        if let Some(owner_id) = filter.owner_id {
            q = q.bind(owner_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(pattern) = filter.like_pattern() {
            q = q.bind(pattern);
        }

        q.bind(limit).bind(offset).fetch_all(executor).await
    }

    /// Count requests matching `filter`.
    pub async fn count<'e, E>(executor: E, filter: &AccessRequestFilter) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("SELECT COUNT(*) FROM access_requests WHERE TRUE");
        filter.push_conditions(&mut query, 0);

        let mut q = sqlx::query_scalar::<_, i64>(&query);

        if let Some(owner_id) = filter.owner_id {
            q = q.bind(owner_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(pattern) = filter.like_pattern() {
            q = q.bind(pattern);
        }

        q.fetch_one(executor).await
    }

    /// Count requests in any of `statuses`.
    pub async fn count_in_statuses<'e, E>(
        executor: E,
        statuses: &[AccessRequestStatus],
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM access_requests WHERE status = ANY($1)")
            .bind(statuses)
            .fetch_one(executor)
            .await
    }
}
