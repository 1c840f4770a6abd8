//! Audit log read access.

use axum::extract::{Query, State};
use axum::{Extension, Json};

use salon_core::store::AuditLog;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AuditLogListResponse, AuditLogParams};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// `GET /admin/audit-logs?limit`: most recent entries first. Admins only.
pub async fn list_audit_logs_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Query(params): Query<AuditLogParams>,
) -> AppResult<Json<AuditLogListResponse>> {
    actor.require_admin()?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let results = state.audit.recent(limit).await?;
    Ok(Json(AuditLogListResponse { results }))
}
