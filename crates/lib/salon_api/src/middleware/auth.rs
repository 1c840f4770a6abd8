//! Authentication middleware: Bearer token extraction, JWT verification and
//! a per-request account status check.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use salon_core::auth::jwt::verify_access_token;
use salon_core::models::admin_user::Role;
use salon_core::store::AdminUserStore;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Identity attached to request extensions by [`require_auth`].
///
/// The role comes from the stored record, not from the token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Reject unless the role may manage user accounts.
    pub fn require_user_manager(&self) -> AppResult<()> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }

    /// Reject unless the role may manage catalog services.
    pub fn require_catalog_manager(&self) -> AppResult<()> {
        if self.role.can_manage_catalog() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }

    /// Reject unless the caller is an administrator.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }

    /// Reject when a non-administrator would touch an `ADMIN` account, either
    /// by granting the role or by editing an account that already holds it.
    pub fn require_may_manage_role(&self, role: Role) -> AppResult<()> {
        if role == Role::Admin && self.role != Role::Admin {
            Err(AppError::Forbidden(
                "Only administrators can manage ADMIN accounts".into(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Resolve an `Authorization` header value into an active identity.
///
/// The user is re-fetched on every call so that deactivation takes effect
/// on the next request even while the token itself is still valid.
pub async fn authenticate(
    users: &dyn AdminUserStore,
    secret: &[u8],
    header: Option<&str>,
) -> AppResult<AuthenticatedUser> {
    let header = header.ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let claims = verify_access_token(token, secret).ok_or_else(|| {
        debug!("rejected invalid or expired token");
        AppError::Unauthorized("Unauthorized".into())
    })?;

    let user_id = salon_core::uuid::parse_id(&claims.sub)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    if !user.status.is_active() {
        return Err(AppError::Forbidden("Account inactive".into()));
    }

    Ok(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    })
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user = authenticate(
        state.users.as_ref(),
        state.config.jwt_secret.as_bytes(),
        header,
    )
    .await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
