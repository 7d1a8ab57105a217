//! Access request lifecycle against a real PostgreSQL database.
//!
//! Run with: `cargo test -p portal-api --features integration`

#![cfg(feature = "integration")]

mod common;

use common::{actor, ctx, sample_request, test_pool};
use portal_api::models::{ApproveAccessRequest, RejectAccessRequest, UpdateAccessRequest};
use portal_api::services::{AccessRequestService, AuditService};
use portal_api::{ApiError, RequestContext};
use portal_core::{Capability, PortalError};
use portal_db::{AccessRequestStatus, AuditAction, AuditLog, NetworkProtocol};

fn portal_error(err: ApiError) -> PortalError {
    match err {
        ApiError::Portal(inner) => inner,
        other => panic!("expected a portal error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_creates_request_and_one_audit_entry() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (user, principal) = actor(&pool, Capability::User).await;

    let created = service
        .submit(&principal, sample_request(), &ctx())
        .await
        .unwrap();

    assert_eq!(created.status, AccessRequestStatus::Created);
    assert_eq!(created.user_id, user.id);
    assert!(created.request_number.starts_with("REQ-"));
    assert_eq!(created.request_number.len(), "REQ-YYYYMMDD-XXXXXXXX".len());
    assert_eq!(created.destination_hostname.as_deref(), Some("db.internal"));
    assert!(created.approver_id.is_none());

    let audit = AuditService::new(pool.clone())
        .list(&principal, None, None)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::Created.as_str());
    assert_eq!(audit[0].access_request_id, Some(created.id));
    assert_eq!(audit[0].resource_id, created.request_number);
    assert_eq!(audit[0].ip_address, "198.51.100.4");
}

#[tokio::test]
async fn test_submit_rejects_invalid_fields() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, principal) = actor(&pool, Capability::User).await;

    let mut bad_ip = sample_request();
    bad_ip.destination_ip = "10.0.0.300".to_string();
    let err = portal_error(service.submit(&principal, bad_ip, &ctx()).await.unwrap_err());
    assert!(err.is_validation());

    let mut bad_port = sample_request();
    bad_port.port = 70000;
    let err = portal_error(service.submit(&principal, bad_port, &ctx()).await.unwrap_err());
    assert!(err.is_validation());

    let mut blank = sample_request();
    blank.business_justification = "   ".to_string();
    let err = portal_error(service.submit(&principal, blank, &ctx()).await.unwrap_err());
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, principal) = actor(&pool, Capability::User).await;

    let created = service
        .submit(&principal, sample_request(), &ctx())
        .await
        .unwrap();

    let updated = service
        .update(
            &principal,
            created.id,
            UpdateAccessRequest {
                port: Some(443),
                protocol: Some(NetworkProtocol::Https),
                ..Default::default()
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert_eq!(updated.port, 443);
    assert_eq!(updated.protocol, NetworkProtocol::Https);
    assert_eq!(updated.destination_ip, created.destination_ip);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.status, AccessRequestStatus::Created);
    assert!(updated.updated_at >= created.updated_at);

    let audit = AuditService::new(pool.clone())
        .list(&principal, None, None)
        .await
        .unwrap();
    let entry = audit
        .iter()
        .find(|a| a.action == AuditAction::Updated.as_str())
        .expect("update audited");
    assert_eq!(entry.old_value.as_ref().unwrap()["port"], 5432);
    assert_eq!(entry.new_value.as_ref().unwrap()["port"], 443);
}

#[tokio::test]
async fn test_update_by_non_owner_is_forbidden() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, admin) = actor(&pool, Capability::Admin).await;

    let created = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    let err = portal_error(
        service
            .update(&admin, created.id, UpdateAccessRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_approve_sets_decision_fields_and_locks_request() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;
    let (approver_user, approver) = actor(&pool, Capability::Approver).await;

    let created = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    let approved = service
        .approve(
            &approver,
            created.id,
            ApproveAccessRequest {
                approval_comment: Some("Looks fine".to_string()),
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert_eq!(approved.status, AccessRequestStatus::Approved);
    assert_eq!(approved.approver_id, Some(approver_user.id));
    assert!(approved.approved_at.is_some());
    assert!(approved.rejected_at.is_none());
    assert_eq!(approved.approval_comment.as_deref(), Some("Looks fine"));

    let err = portal_error(
        service
            .update(&owner, created.id, UpdateAccessRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_invalid_state());

    let err = portal_error(
        service
            .reject(
                &approver,
                created.id,
                RejectAccessRequest {
                    rejection_reason: "too late".to_string(),
                },
                &ctx(),
            )
            .await
            .unwrap_err(),
    );
    assert!(err.is_invalid_state());
}

#[tokio::test]
async fn test_reject_requires_reason_and_records_it() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, admin) = actor(&pool, Capability::Admin).await;
    let (_, approver) = actor(&pool, Capability::Approver).await;

    let created = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    let err = portal_error(
        service
            .reject(
                &admin,
                created.id,
                RejectAccessRequest {
                    rejection_reason: "  ".to_string(),
                },
                &ctx(),
            )
            .await
            .unwrap_err(),
    );
    assert!(err.is_validation());

    let rejected = service
        .reject(
            &approver,
            created.id,
            RejectAccessRequest {
                rejection_reason: "Port not allowed".to_string(),
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, AccessRequestStatus::Rejected);
    assert!(rejected.rejected_at.is_some());
    assert!(rejected.approved_at.is_none());
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Port not allowed"));

    // Approvers only see their own audit entries: exactly the rejection.
    let audit = AuditService::new(pool.clone())
        .list(&approver, None, None)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    let entry = &audit[0];
    assert_eq!(entry.action, AuditAction::Rejected.as_str());
    assert_eq!(entry.access_request_id, Some(created.id));
    assert!(entry.details.contains("Port not allowed"));
}

#[tokio::test]
async fn test_plain_user_cannot_decide() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;

    let created = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    let err = portal_error(
        service
            .approve(&owner, created.id, ApproveAccessRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_view_and_search_are_scoped_to_owner() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, alice) = actor(&pool, Capability::User).await;
    let (_, bob) = actor(&pool, Capability::User).await;

    let alices = service
        .submit(&alice, sample_request(), &ctx())
        .await
        .unwrap();
    service
        .submit(&alice, sample_request(), &ctx())
        .await
        .unwrap();

    let err = portal_error(service.get_request(&bob, alices.id).await.unwrap_err());
    assert!(err.is_forbidden());

    let (requests, total) = service.search(&alice, None, None, 0, 1).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(total, 2);

    let (requests, total) = service.search(&bob, None, None, 0, 50).await.unwrap();
    assert!(requests.is_empty());
    assert_eq!(total, 0);

    let (requests, _) = service
        .search(&alice, Some(alices.request_number.clone()), None, 0, 50)
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, alices.id);
}

#[tokio::test]
async fn test_search_limit_bounds() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, principal) = actor(&pool, Capability::User).await;

    for limit in [0, 101] {
        let err = portal_error(
            service
                .search(&principal, None, None, 0, limit)
                .await
                .unwrap_err(),
        );
        assert!(err.is_validation());
    }
}

#[tokio::test]
async fn test_missing_request_is_not_found() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, admin) = actor(&pool, Capability::Admin).await;

    let err = portal_error(
        service
            .get_request(&admin, uuid::Uuid::new_v4())
            .await
            .unwrap_err(),
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_second_decision_is_invalid_state() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, approver) = actor(&pool, Capability::Approver).await;

    let approved = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();
    service
        .approve(&approver, approved.id, ApproveAccessRequest::default(), &ctx())
        .await
        .unwrap();
    let err = portal_error(
        service
            .approve(&approver, approved.id, ApproveAccessRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_invalid_state());

    let rejected = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();
    service
        .reject(
            &approver,
            rejected.id,
            RejectAccessRequest {
                rejection_reason: "No".to_string(),
            },
            &ctx(),
        )
        .await
        .unwrap();
    let err = portal_error(
        service
            .approve(&approver, rejected.id, ApproveAccessRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_invalid_state());

    let err = portal_error(
        service
            .reject(
                &approver,
                rejected.id,
                RejectAccessRequest {
                    rejection_reason: "Still no".to_string(),
                },
                &ctx(),
            )
            .await
            .unwrap_err(),
    );
    assert!(err.is_invalid_state());

    let current = service.get_request(&owner, rejected.id).await.unwrap();
    assert_eq!(current.status, AccessRequestStatus::Rejected);
    assert_eq!(current.rejection_reason.as_deref(), Some("No"));
}

#[tokio::test]
async fn test_concurrent_approvals_only_one_wins() {
    let pool = test_pool().await;
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, first) = actor(&pool, Capability::Approver).await;
    let (_, second) = actor(&pool, Capability::Approver).await;

    let created = AccessRequestService::new(pool.clone())
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|approver| {
            let service = AccessRequestService::new(pool.clone());
            let id = created.id;
            tokio::spawn(async move {
                service
                    .approve(&approver, id, ApproveAccessRequest::default(), &ctx())
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(approved) => {
                assert_eq!(approved.status, AccessRequestStatus::Approved);
                successes += 1;
            }
            Err(err) => assert!(portal_error(err).is_invalid_state()),
        }
    }
    assert_eq!(successes, 1);

    let entries = AuditLog::list_for_request(&pool, created.id).await.unwrap();
    let approvals = entries
        .iter()
        .filter(|e| e.action == AuditAction::Approved.as_str())
        .count();
    assert_eq!(approvals, 1);
}

#[tokio::test]
async fn test_failed_audit_write_rolls_back_decision() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, approver) = actor(&pool, Capability::Approver).await;

    let created = service
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();

    // Longer than the audit_logs.ip_address column.
    let oversized = RequestContext::new("9".repeat(100), "integration-test");
    let err = service
        .approve(&approver, created.id, ApproveAccessRequest::default(), &oversized)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Database(_)), "{err:?}");

    let current = service.get_request(&owner, created.id).await.unwrap();
    assert_eq!(current.status, AccessRequestStatus::Created);
    assert!(current.approver_id.is_none());
    assert!(current.approved_at.is_none());

    let entries = AuditLog::list_for_request(&pool, created.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Created.as_str());
}

#[tokio::test]
async fn test_unparseable_forwarded_for_still_audits() {
    let pool = test_pool().await;
    let service = AccessRequestService::new(pool.clone());
    let (_, principal) = actor(&pool, Capability::User).await;

    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        axum::http::HeaderValue::from_str(&"f".repeat(100)).unwrap(),
    );
    let peer = "192.0.2.10:51000".parse().unwrap();
    let request_ctx = RequestContext::from_headers(&headers, Some(peer));

    let created = service
        .submit(&principal, sample_request(), &request_ctx)
        .await
        .unwrap();

    let entries = AuditLog::list_for_request(&pool, created.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ip_address, "192.0.2.10");
}
