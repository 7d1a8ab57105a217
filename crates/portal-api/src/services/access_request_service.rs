//! Access request lifecycle engine.
//!
//! Owns the status machine (`created` → `pending_approval` → `approved`,
//! `created` → `rejected`), the permission checks for each operation and
//! the audit entry every mutation emits. Each mutation runs in one
//! transaction that locks the target row before checking its status, so
//! concurrent decisions on the same request serialize and the audit entry
//! commits together with the change.

use chrono::Utc;
use portal_core::{
    generate_request_number, require_text, validate_ip, validate_port, PortalError, Principal,
};
use portal_db::{
    is_unique_violation, AccessRequest, AccessRequestChanges, AccessRequestFilter,
    AccessRequestStatus, AuditAction, AuditResourceType, NewAccessRequest,
    REQUEST_NUMBER_CONSTRAINT,
};
use sqlx::{Connection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extractors::RequestContext;
use crate::models::{
    ApproveAccessRequest, CreateAccessRequest, RejectAccessRequest, UpdateAccessRequest,
    MAX_SEARCH_LIMIT,
};
use crate::services::audit_service::AuditRecord;

/// Attempts at drawing an unused request number before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 3;

const RESOURCE: &str = "Access request";

/// Service for access request operations.
pub struct AccessRequestService {
    pool: PgPool,
}

impl AccessRequestService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a new request in status `created`.
    pub async fn submit(
        &self,
        principal: &Principal,
        input: CreateAccessRequest,
        ctx: &RequestContext,
    ) -> ApiResult<AccessRequest> {
        let source_ip = validate_ip("source_ip", &input.source_ip)?;
        let destination_ip = validate_ip("destination_ip", &input.destination_ip)?;
        let port = validate_port(input.port)?;
        require_text("description", &input.description)?;
        require_text("business_justification", &input.business_justification)?;

        let new_request = NewAccessRequest {
            request_number: String::new(),
            user_id: principal.user_id,
            source_ip: source_ip.to_string(),
            destination_ip: destination_ip.to_string(),
            destination_hostname: normalize_hostname(input.destination_hostname),
            port: i32::from(port),
            protocol: input.protocol,
            description: input.description,
            business_justification: input.business_justification,
        };

        let mut tx = self.pool.begin().await?;

        let request = insert_with_fresh_number(&mut tx, new_request).await?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::Created,
            AuditResourceType::AccessRequest,
            &request.request_number,
        )
        .access_request(request.id)
        .details("Created access request")
        .new_value(&request)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = %request.id,
            request_number = %request.request_number,
            user_id = %principal.user_id,
            "Access request submitted"
        );

        Ok(request)
    }

    /// Apply owner edits while the request is still `created`.
    ///
    /// Checks run in order: existence, ownership, status.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateAccessRequest,
        ctx: &RequestContext,
    ) -> ApiResult<AccessRequest> {
        let changes = validated_changes(input)?;

        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        principal.require_owner(current.user_id)?;
        if !current.status.is_editable() {
            return Err(PortalError::InvalidState(format!(
                "Cannot update a request in status '{}'",
                current.status
            ))
            .into());
        }

        let updated = AccessRequest::apply_changes(&mut *tx, id, &changes).await?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::Updated,
            AuditResourceType::AccessRequest,
            &updated.request_number,
        )
        .access_request(updated.id)
        .details("Updated access request")
        .old_value(&current)?
        .new_value(&updated)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = %updated.id,
            request_number = %updated.request_number,
            "Access request updated"
        );

        Ok(updated)
    }

    /// Approve a `created` request.
    ///
    /// The request passes through `pending_approval` inside the same
    /// transaction, so callers only ever observe `created` or `approved`.
    pub async fn approve(
        &self,
        principal: &Principal,
        id: Uuid,
        input: ApproveAccessRequest,
        ctx: &RequestContext,
    ) -> ApiResult<AccessRequest> {
        principal.require_decider()?;
        let comment = input
            .approval_comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        ensure_decidable(&current)?;

        AccessRequest::mark_pending_approval(&mut *tx, id).await?;
        let approved =
            AccessRequest::record_approval(&mut *tx, id, principal.user_id, comment.as_deref())
                .await?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::Approved,
            AuditResourceType::AccessRequest,
            &approved.request_number,
        )
        .access_request(approved.id)
        .details("Approved access request")
        .old_value(&current)?
        .new_value(&approved)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = %approved.id,
            request_number = %approved.request_number,
            approver_id = %principal.user_id,
            "Access request approved"
        );

        Ok(approved)
    }

    /// Reject a `created` request. A non-blank reason is required.
    pub async fn reject(
        &self,
        principal: &Principal,
        id: Uuid,
        input: RejectAccessRequest,
        ctx: &RequestContext,
    ) -> ApiResult<AccessRequest> {
        principal.require_decider()?;
        require_text("rejection_reason", &input.rejection_reason)?;
        let reason = input.rejection_reason.trim();

        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        ensure_decidable(&current)?;

        let rejected =
            AccessRequest::record_rejection(&mut *tx, id, principal.user_id, reason).await?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::Rejected,
            AuditResourceType::AccessRequest,
            &rejected.request_number,
        )
        .access_request(rejected.id)
        .details(format!("Rejected access request: {reason}"))
        .old_value(&current)?
        .new_value(&rejected)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = %rejected.id,
            request_number = %rejected.request_number,
            approver_id = %principal.user_id,
            "Access request rejected"
        );

        Ok(rejected)
    }

    /// Fetch one request. Visible to its owner and to admins.
    pub async fn get_request(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> ApiResult<AccessRequest> {
        let request = AccessRequest::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| PortalError::not_found(RESOURCE, id))?;
        principal.require_view(request.user_id)?;
        Ok(request)
    }

    /// Search requests visible to `principal`, newest first.
    ///
    /// Approvers and admins search every request; other callers only their
    /// own. The returned total is computed over the same scope.
    pub async fn search(
        &self,
        principal: &Principal,
        query: Option<String>,
        status: Option<AccessRequestStatus>,
        skip: i64,
        limit: i64,
    ) -> ApiResult<(Vec<AccessRequest>, i64)> {
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(PortalError::validation(
                "limit",
                format!("Must be between 1 and {MAX_SEARCH_LIMIT}"),
            )
            .into());
        }
        if skip < 0 {
            return Err(PortalError::validation("skip", "Must not be negative").into());
        }

        let filter = AccessRequestFilter {
            owner_id: principal.request_scope(),
            status,
            query: query.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
        };

        let requests = AccessRequest::search(&self.pool, &filter, limit, skip).await?;
        let total = AccessRequest::count(&self.pool, &filter).await?;

        Ok((requests, total))
    }
}

/// Insert `input` under a freshly generated number, retrying on collision.
///
/// Each attempt runs in a savepoint so a unique violation does not abort
/// the surrounding transaction.
async fn insert_with_fresh_number(
    tx: &mut Transaction<'_, Postgres>,
    mut input: NewAccessRequest,
) -> ApiResult<AccessRequest> {
    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        input.request_number = generate_request_number(Utc::now());

        let mut savepoint = tx.begin().await?;
        match AccessRequest::insert(&mut *savepoint, &input).await {
            Ok(request) => {
                savepoint.commit().await?;
                return Ok(request);
            }
            Err(e) if is_unique_violation(&e, REQUEST_NUMBER_CONSTRAINT) => {
                tracing::warn!(
                    attempt,
                    request_number = %input.request_number,
                    "Request number collision, drawing a new one"
                );
                savepoint.rollback().await?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(PortalError::Storage(format!(
        "No unused request number after {MAX_NUMBER_ATTEMPTS} attempts"
    ))
    .into())
}

async fn lock_request(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> ApiResult<AccessRequest> {
    Ok(AccessRequest::find_by_id_for_update(&mut **tx, id)
        .await?
        .ok_or_else(|| PortalError::not_found(RESOURCE, id))?)
}

fn ensure_decidable(request: &AccessRequest) -> Result<(), PortalError> {
    if request.status.is_decidable() {
        Ok(())
    } else {
        Err(PortalError::InvalidState(format!(
            "Request {} is already '{}'",
            request.request_number, request.status
        )))
    }
}

fn normalize_hostname(hostname: Option<String>) -> Option<String> {
    hostname
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

/// Validate the supplied fields and convert them to column values.
fn validated_changes(input: UpdateAccessRequest) -> Result<AccessRequestChanges, PortalError> {
    let destination_ip = input
        .destination_ip
        .as_deref()
        .map(|ip| validate_ip("destination_ip", ip).map(|ip| ip.to_string()))
        .transpose()?;
    let port = input
        .port
        .map(|p| validate_port(p).map(i32::from))
        .transpose()?;
    if let Some(description) = &input.description {
        require_text("description", description)?;
    }
    if let Some(justification) = &input.business_justification {
        require_text("business_justification", justification)?;
    }

    Ok(AccessRequestChanges {
        destination_ip,
        destination_hostname: normalize_hostname(input.destination_hostname),
        port,
        protocol: input.protocol,
        description: input.description,
        business_justification: input.business_justification,
    })
}
