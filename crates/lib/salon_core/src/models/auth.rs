//! Authentication domain models.

use serde::{Deserialize, Serialize};

use super::admin_user::Role;

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: admin user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Role at issuance. The guard re-reads the stored role on every request.
    pub role: Role,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
