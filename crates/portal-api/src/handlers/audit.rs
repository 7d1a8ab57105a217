//! Audit log handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use portal_db::AuditLog;

use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::CurrentUser;
use crate::models::ListAuditQuery;
use crate::router::ApiState;

/// List audit entries, newest first. Non-admins only see their own actions.
#[utoipa::path(
    get,
    path = "/audit/",
    tag = "Audit",
    params(ListAuditQuery),
    responses(
        (status = 200, description = "Audit entries", body = Vec<AuditLog>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_audit_logs(
    State(state): State<ApiState>,
    current: CurrentUser,
    Query(query): Query<ListAuditQuery>,
) -> ApiResult<Json<Vec<AuditLog>>> {
    let logs = state
        .audit_service
        .list(&current.principal, query.skip, query.limit)
        .await?;
    Ok(Json(logs))
}
