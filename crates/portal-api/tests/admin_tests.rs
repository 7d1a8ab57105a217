//! Administration and configuration against a real PostgreSQL database.
//!
//! Run with: `cargo test -p portal-api --features integration`

#![cfg(feature = "integration")]

mod common;

use common::{actor, ctx, sample_request, test_pool};
use portal_api::models::{AdminUpdateUserRequest, UpdateProfileRequest, UpsertConfigRequest};
use portal_api::services::{
    AccessRequestService, AdminService, AuditService, ConfigurationService, UserService,
};
use portal_api::ApiError;
use portal_auth::PortalClaims;
use portal_core::{Capability, PortalError};
use portal_db::{AuditAction, UserRole};
use uuid::Uuid;

fn portal_error(err: ApiError) -> PortalError {
    match err {
        ApiError::Portal(inner) => inner,
        other => panic!("expected a portal error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_updates_user_with_audit() {
    let pool = test_pool().await;
    let service = AdminService::new(pool.clone());
    let (target, _) = actor(&pool, Capability::User).await;
    let (_, admin) = actor(&pool, Capability::Admin).await;

    let updated = service
        .update_user(
            &admin,
            target.id,
            AdminUpdateUserRequest {
                role: Some(UserRole::Approver),
                is_active: Some(false),
                ..Default::default()
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert_eq!(updated.role, UserRole::Approver);
    assert!(!updated.is_active);
    assert_eq!(updated.email, target.email);

    let audit = AuditService::new(pool.clone())
        .list(&admin, None, Some(100))
        .await
        .unwrap();
    let entry = audit
        .iter()
        .find(|a| a.resource_id == target.id.to_string())
        .expect("user update audited");
    assert_eq!(entry.action, AuditAction::UserUpdated.as_str());
    assert_eq!(entry.resource_type, "user");
    assert!(entry.access_request_id.is_none());
}

#[tokio::test]
async fn test_admin_operations_need_admin() {
    let pool = test_pool().await;
    let service = AdminService::new(pool.clone());
    let (_, approver) = actor(&pool, Capability::Approver).await;

    let err = portal_error(service.stats(&approver).await.unwrap_err());
    assert!(err.is_forbidden());

    let err = portal_error(
        service
            .list_users(&approver, None, None)
            .await
            .unwrap_err(),
    );
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    let pool = test_pool().await;
    let (_, admin) = actor(&pool, Capability::Admin).await;

    let err = portal_error(
        AdminService::new(pool.clone())
            .update_user(&admin, Uuid::new_v4(), AdminUpdateUserRequest::default(), &ctx())
            .await
            .unwrap_err(),
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stats_count_pending_requests() {
    let pool = test_pool().await;
    let (_, owner) = actor(&pool, Capability::User).await;
    let (_, admin) = actor(&pool, Capability::Admin).await;
    let admin_service = AdminService::new(pool.clone());

    let before = admin_service.stats(&admin).await.unwrap();
    AccessRequestService::new(pool.clone())
        .submit(&owner, sample_request(), &ctx())
        .await
        .unwrap();
    let after = admin_service.stats(&admin).await.unwrap();

    assert!(after.total_requests > before.total_requests);
    assert!(after.pending_requests > before.pending_requests);
    assert!(after.total_users >= 2);
}

#[tokio::test]
async fn test_configuration_upsert_and_delete() {
    let pool = test_pool().await;
    let service = ConfigurationService::new(pool.clone());
    let (_, admin) = actor(&pool, Capability::Admin).await;
    let key = format!("banner-{}", Uuid::new_v4().simple());

    let first = service
        .upsert(
            &admin,
            &key,
            UpsertConfigRequest {
                value: "Maintenance Friday".to_string(),
                description: Some("Top banner".to_string()),
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(first.value, "Maintenance Friday");

    let second = service
        .upsert(
            &admin,
            &key,
            UpsertConfigRequest {
                value: "All clear".to_string(),
                description: None,
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(second.value, "All clear");

    let entries = service.list(&admin).await.unwrap();
    assert_eq!(entries.iter().filter(|c| c.key == key).count(), 1);

    service.delete(&admin, &key, &ctx()).await.unwrap();
    let err = portal_error(service.delete(&admin, &key, &ctx()).await.unwrap_err());
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_configuration_requires_admin() {
    let pool = test_pool().await;
    let (_, user) = actor(&pool, Capability::User).await;

    let err = portal_error(
        ConfigurationService::new(pool.clone())
            .list(&user)
            .await
            .unwrap_err(),
    );
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_profile_update_keeps_role() {
    let pool = test_pool().await;
    let (user, _) = actor(&pool, Capability::User).await;
    let email = format!("renamed-{}@example.test", Uuid::new_v4().simple());

    let updated = UserService::new(pool.clone())
        .update_profile(
            &user,
            UpdateProfileRequest {
                email: Some(email.clone()),
                first_name: Some("Ada".to_string()),
                last_name: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email.as_deref(), Some(email.as_str()));
    assert_eq!(updated.first_name.as_deref(), Some("Ada"));
    assert_eq!(updated.role, user.role);
}

fn assert_field_error(err: ApiError, expected: &str) {
    match portal_error(err) {
        PortalError::Validation { field, .. } => assert_eq!(field, expected),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_profile_email_taken_is_validation_error() {
    let pool = test_pool().await;
    let (taken, _) = actor(&pool, Capability::User).await;
    let (user, _) = actor(&pool, Capability::User).await;

    let err = UserService::new(pool.clone())
        .update_profile(
            &user,
            UpdateProfileRequest {
                email: taken.email.clone(),
                first_name: None,
                last_name: None,
            },
        )
        .await
        .unwrap_err();
    assert_field_error(err, "email");
}

#[tokio::test]
async fn test_admin_email_taken_is_validation_error() {
    let pool = test_pool().await;
    let (taken, _) = actor(&pool, Capability::User).await;
    let (target, _) = actor(&pool, Capability::User).await;
    let (_, admin) = actor(&pool, Capability::Admin).await;

    let err = AdminService::new(pool.clone())
        .update_user(
            &admin,
            target.id,
            AdminUpdateUserRequest {
                email: taken.email.clone(),
                ..Default::default()
            },
            &ctx(),
        )
        .await
        .unwrap_err();
    assert_field_error(err, "email");
}

#[tokio::test]
async fn test_resolve_records_highest_claimed_role() {
    let pool = test_pool().await;
    let suffix = Uuid::new_v4().simple().to_string();
    let claims = PortalClaims::builder()
        .subject(format!("sub-{suffix}"))
        .username(format!("resolve-{suffix}"))
        .roles(vec!["user", "approver"])
        .realm_roles(vec!["offline_access"])
        .build();

    let service = UserService::new(pool.clone());
    let (user, principal) = service.resolve(&claims).await.unwrap();

    assert_eq!(user.role, UserRole::Approver);
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.highest_capability(), Capability::Approver);
    assert!(!principal.is_admin());

    let (again, _) = service.resolve(&claims).await.unwrap();
    assert_eq!(again.id, user.id);
}

#[tokio::test]
async fn test_resolve_username_taken_is_validation_error() {
    let pool = test_pool().await;
    let (existing, _) = actor(&pool, Capability::User).await;
    let claims = PortalClaims::builder()
        .subject(format!("sub-{}", Uuid::new_v4().simple()))
        .username(existing.username.clone())
        .build();

    let err = UserService::new(pool.clone())
        .resolve(&claims)
        .await
        .unwrap_err();
    assert_field_error(err, "username");
}
