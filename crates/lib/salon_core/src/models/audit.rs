//! Audit log domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::admin_user::UnknownVariant;

/// Administrative action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    AdminCreatedUser,
    AdminUpdatedUser,
    AdminCreatedService,
    AdminDeletedService,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::AdminCreatedUser => "ADMIN_CREATED_USER",
            AuditAction::AdminUpdatedUser => "ADMIN_UPDATED_USER",
            AuditAction::AdminCreatedService => "ADMIN_CREATED_SERVICE",
            AuditAction::AdminDeletedService => "ADMIN_DELETED_SERVICE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN_CREATED_USER" => Ok(AuditAction::AdminCreatedUser),
            "ADMIN_UPDATED_USER" => Ok(AuditAction::AdminUpdatedUser),
            "ADMIN_CREATED_SERVICE" => Ok(AuditAction::AdminCreatedService),
            "ADMIN_DELETED_SERVICE" => Ok(AuditAction::AdminDeletedService),
            other => Err(UnknownVariant {
                kind: "audit action",
                value: other.to_string(),
            }),
        }
    }
}

/// Where an action came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Append payload for the audit log.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub actor_admin_id: Uuid,
    pub target_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub context: RequestContext,
}

/// Immutable audit log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub actor_admin_id: Uuid,
    pub target_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Materialize an entry from its append payload.
    pub fn from_new(id: Uuid, entry: NewAuditEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            action: entry.action,
            actor_admin_id: entry.actor_admin_id,
            target_id: entry.target_id,
            metadata: entry.metadata,
            ip_address: entry.context.ip_address,
            user_agent: entry.context.user_agent,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_match_wire_format() {
        for action in [
            AuditAction::AdminCreatedUser,
            AuditAction::AdminUpdatedUser,
            AuditAction::AdminCreatedService,
            AuditAction::AdminDeletedService,
        ] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, serde_json::Value::String(action.as_str().into()));
            assert_eq!(action.as_str().parse::<AuditAction>(), Ok(action));
        }
    }
}
