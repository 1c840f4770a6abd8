//! Authentication primitives.
//!
//! Provides password hashing, password strength rules and JWT management
//! shared by the login flow and the request guard in `salon_api`.

pub mod jwt;
pub mod password;
pub mod policy;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
