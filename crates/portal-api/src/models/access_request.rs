//! Request and response models for access request endpoints.

use chrono::{DateTime, Utc};
use portal_db::{AccessRequest, AccessRequestStatus, NetworkProtocol};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Default page size for request searches.
pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Maximum page size for request searches.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Request to open a network path.
///
/// IP literals, port range and required text are checked by the lifecycle
/// engine; the attributes here only bound field sizes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAccessRequest {
    /// IPv4 or IPv6 literal.
    #[validate(length(max = 45))]
    pub source_ip: String,

    /// IPv4 or IPv6 literal.
    #[validate(length(max = 45))]
    pub destination_ip: String,

    #[validate(length(max = 255))]
    pub destination_hostname: Option<String>,

    /// 1-65535.
    pub port: i64,

    #[serde(default)]
    pub protocol: NetworkProtocol,

    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(length(max = 5000))]
    pub business_justification: String,
}

/// Partial update of an owned request. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAccessRequest {
    #[validate(length(max = 45))]
    pub destination_ip: Option<String>,

    #[validate(length(max = 255))]
    pub destination_hostname: Option<String>,

    pub port: Option<i64>,

    pub protocol: Option<NetworkProtocol>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 5000))]
    pub business_justification: Option<String>,
}

/// Request to approve an access request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveAccessRequest {
    #[validate(length(max = 2000, message = "Comment must not exceed 2000 characters"))]
    pub approval_comment: Option<String>,
}

/// Request to reject an access request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectAccessRequest {
    /// Required explanation for the requester.
    #[validate(length(max = 2000, message = "Reason must not exceed 2000 characters"))]
    pub rejection_reason: String,
}

/// Query parameters for searching requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchRequestsQuery {
    /// Case-insensitive substring of request number, source or destination IP.
    pub query: Option<String>,

    pub status: Option<AccessRequestStatus>,

    /// Number of results to skip.
    #[param(minimum = 0)]
    pub skip: Option<i64>,

    /// Maximum number of results (default: 50, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

/// Access request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestResponse {
    pub id: Uuid,
    pub request_number: String,
    pub user_id: Uuid,
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

impl From<AccessRequest> for AccessRequestResponse {
    fn from(r: AccessRequest) -> Self {
        Self {
            id: r.id,
            request_number: r.request_number,
            user_id: r.user_id,
            approver_id: r.approver_id,
            source_ip: r.source_ip,
            destination_ip: r.destination_ip,
            destination_hostname: r.destination_hostname,
            port: r.port,
            protocol: r.protocol,
            description: r.description,
            business_justification: r.business_justification,
            status: r.status,
            approval_comment: r.approval_comment,
            rejection_reason: r.rejection_reason,
            created_at: r.created_at,
            updated_at: r.updated_at,
            approved_at: r.approved_at,
            rejected_at: r.rejected_at,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestSearchResponse {
    pub requests: Vec<AccessRequestResponse>,
    /// Matches visible to the caller across all pages.
    pub total: i64,
    /// Zero-based page index, `skip / page_size`.
    pub page: i64,
    pub page_size: i64,
}
