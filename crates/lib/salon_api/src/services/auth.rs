//! Authentication service: login flow and the blocking bcrypt wrappers
//! shared with user administration.

use tracing::{info, warn};

use salon_core::auth::AuthError;
use salon_core::auth::jwt::generate_access_token;
use salon_core::models::admin_user::normalize_email;
use salon_core::store::AdminUserStore;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{LoginResponse, PublicProfile};

// ---------------------------------------------------------------------------
// Password hashing (bcrypt is CPU-bound; keep it off the async workers)
// ---------------------------------------------------------------------------

/// Hash a password with bcrypt at the configured cost.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        salon_core::auth::password::hash_password(&password, cost)
    })
    .await
    .map_err(|e| AppError::Internal(format!("password hash task: {e}")))?
    .map_err(AppError::from)
}

/// Verify a password against a bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || {
        salon_core::auth::password::verify_password(&password, &hash)
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verify task: {e}")))?
    .map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// Public auth operations
// ---------------------------------------------------------------------------

/// Authenticate with email + password.
///
/// Unknown email and wrong password produce the same error. An inactive
/// account is reported as such, but only after the email matched.
pub async fn login(
    users: &dyn AdminUserStore,
    config: &ApiConfig,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<LoginResponse> {
    let (email, password) = match (email, password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
        _ => return Err(AppError::Validation("Email and password required".into())),
    };
    let email = normalize_email(email);

    let Some(record) = users.find_by_email_with_password(&email).await? else {
        info!("login rejected: unknown email");
        return Err(AuthError::CredentialError.into());
    };

    if !record.user.status.is_active() {
        warn!(user_id = %record.user.id, "login rejected: account inactive");
        return Err(AuthError::AccountInactive.into());
    }

    if !verify_password(password, &record.password_hash).await? {
        info!(user_id = %record.user.id, "login rejected: wrong password");
        return Err(AuthError::CredentialError.into());
    }

    let token = generate_access_token(
        record.user.id,
        record.user.role,
        config.jwt_secret.as_bytes(),
        config.access_token_ttl,
    )?;

    info!(user_id = %record.user.id, role = %record.user.role, "admin logged in");

    Ok(LoginResponse {
        token,
        user: PublicProfile::from(&record.user),
    })
}
