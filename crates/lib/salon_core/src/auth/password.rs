//! Password hashing via bcrypt.

use tracing::warn;

use super::AuthError;

/// Default bcrypt cost factor for new hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Cost range bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Return `cost` when bcrypt accepts it, otherwise [`DEFAULT_BCRYPT_COST`].
pub fn checked_cost(cost: u32) -> u32 {
    if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        cost
    } else {
        warn!(
            cost,
            min = MIN_BCRYPT_COST,
            max = MAX_BCRYPT_COST,
            "bcrypt cost out of range, using default {DEFAULT_BCRYPT_COST}"
        );
        DEFAULT_BCRYPT_COST
    }
}

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}
