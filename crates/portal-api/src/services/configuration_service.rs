//! Key/value portal settings.

use portal_core::{require_text, PortalError, Principal};
use portal_db::{AuditAction, AuditResourceType, Configuration};
use sqlx::PgPool;

use crate::error::ApiResult;
use crate::extractors::RequestContext;
use crate::models::UpsertConfigRequest;
use crate::services::audit_service::AuditRecord;

/// Service for admin-managed configuration entries.
pub struct ConfigurationService {
    pool: PgPool,
}

impl ConfigurationService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, principal: &Principal) -> ApiResult<Vec<Configuration>> {
        principal.require_admin()?;
        Ok(Configuration::list(&self.pool).await?)
    }

    /// Create or replace the entry stored under `key`.
    pub async fn upsert(
        &self,
        principal: &Principal,
        key: &str,
        input: UpsertConfigRequest,
        ctx: &RequestContext,
    ) -> ApiResult<Configuration> {
        principal.require_admin()?;
        require_text("key", key)?;

        let mut tx = self.pool.begin().await?;

        let previous = Configuration::find_by_key(&mut *tx, key).await?;
        let entry =
            Configuration::upsert(&mut *tx, key, &input.value, input.description.as_deref())
                .await?;

        let mut record = AuditRecord::new(
            principal,
            ctx,
            AuditAction::ConfigUpdated,
            AuditResourceType::Configuration,
            key,
        )
        .details(format!("Set configuration '{key}'"));
        if let Some(previous) = &previous {
            record = record.old_value(previous)?;
        }
        record.new_value(&entry)?.write(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(key = %key, created = previous.is_none(), "Configuration updated");
        Ok(entry)
    }

    /// Delete the entry stored under `key`.
    pub async fn delete(
        &self,
        principal: &Principal,
        key: &str,
        ctx: &RequestContext,
    ) -> ApiResult<()> {
        principal.require_admin()?;

        let mut tx = self.pool.begin().await?;

        let removed = Configuration::delete(&mut *tx, key)
            .await?
            .ok_or_else(|| PortalError::not_found("Configuration", key))?;

        AuditRecord::new(
            principal,
            ctx,
            AuditAction::ConfigDeleted,
            AuditResourceType::Configuration,
            key,
        )
        .details(format!("Deleted configuration '{key}'"))
        .old_value(&removed)?
        .write(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(key = %key, "Configuration deleted");
        Ok(())
    }
}
