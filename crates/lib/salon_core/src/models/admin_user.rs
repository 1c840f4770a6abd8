//! Admin user domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a display name, in characters.
pub const NAME_MAX_LEN: usize = 120;

/// Maximum length of an email address, in characters.
pub const EMAIL_MAX_LEN: usize = 200;

/// A string did not match any variant of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// =============================================================================
// Enums
// =============================================================================

/// Role of an admin-managed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Support,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Support, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Support => "SUPPORT",
            Role::User => "USER",
        }
    }

    /// Whether this role may create, list and edit other accounts.
    pub fn can_manage_users(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Whether this role may add or remove catalog services.
    pub fn can_manage_catalog(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Account status. Only active accounts may authenticate or act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
        }
    }

    pub fn is_active(self) -> bool {
        self == UserStatus::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(UserStatus::Active),
            "INACTIVE" => Ok(UserStatus::Inactive),
            other => Err(UnknownVariant {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Ordering of user listings by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSort {
    #[default]
    Newest,
    Oldest,
}

impl UserSort {
    /// `"oldest"` selects ascending order; anything else is newest-first.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("oldest") => UserSort::Oldest,
            _ => UserSort::Newest,
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Admin user without credentials. This is the only shape read paths return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_by_admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin user with password hash (login path only).
#[derive(Debug, Clone)]
pub struct AdminUserWithPassword {
    pub user: AdminUser,
    pub password_hash: String,
}

/// Insert payload. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_by_admin_id: Option<Uuid>,
}

/// Partial update of the editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.status.is_none()
    }
}

/// Filter, order and window for a user listing.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Case-insensitive substring matched against name or email.
    pub search: Option<String>,
    pub sort: UserSort,
    pub offset: i64,
    pub limit: i64,
}

/// One page of users plus the total number of matches.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    pub total: i64,
    pub users: Vec<AdminUser>,
}

/// Trim and lowercase an email address for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn role_rejects_legacy_values() {
        for legacy in ["Staff", "customer", "Receptionist", "admin"] {
            let err = legacy.parse::<Role>().unwrap_err();
            assert_eq!(err.kind, "role");
        }
    }

    #[test]
    fn role_serializes_screaming_case() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"MANAGER\"");
    }

    #[test]
    fn only_admin_and_manager_manage_users() {
        assert!(Role::Admin.can_manage_users());
        assert!(Role::Manager.can_manage_users());
        assert!(!Role::Support.can_manage_users());
        assert!(!Role::User.can_manage_users());
    }

    #[test]
    fn status_parse() {
        assert_eq!("ACTIVE".parse::<UserStatus>(), Ok(UserStatus::Active));
        assert_eq!("INACTIVE".parse::<UserStatus>(), Ok(UserStatus::Inactive));
        assert!("inactive".parse::<UserStatus>().is_err());
    }

    #[test]
    fn sort_defaults_to_newest() {
        assert_eq!(UserSort::parse_lenient(None), UserSort::Newest);
        assert_eq!(UserSort::parse_lenient(Some("bogus")), UserSort::Newest);
        assert_eq!(UserSort::parse_lenient(Some("oldest")), UserSort::Oldest);
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn admin_user_json_has_no_hash_field() {
        let user = AdminUser {
            id: Uuid::nil(),
            name: "A".into(),
            email: "a@x.com".into(),
            role: Role::Admin,
            status: UserStatus::Active,
            created_by_admin_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
