//! Audit recording for administrative actions.
//!
//! Failures are logged and swallowed: the action they describe has already
//! been committed and the caller still gets its result.

use tracing::{info, warn};

use salon_core::models::audit::NewAuditEntry;
use salon_core::store::AuditLog;

/// Append an entry to the audit log and mirror it as an `audit` tracing event.
pub async fn record(audit: &dyn AuditLog, entry: NewAuditEntry) {
    let action = entry.action;
    let actor = entry.actor_admin_id;
    let target = entry.target_id;
    match audit.append(entry).await {
        Ok(saved) => info!(
            target: "audit",
            action = %action,
            actor_admin_id = %actor,
            target_id = ?target,
            ip_address = ?saved.ip_address,
            entry_id = %saved.id,
            "admin action recorded"
        ),
        Err(e) => warn!(
            target: "audit",
            action = %action,
            actor_admin_id = %actor,
            target_id = ?target,
            "failed to record audit log: {e}"
        ),
    }
}
