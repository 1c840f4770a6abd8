//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use tracing::warn;

use salon_core::models::admin_user::normalize_email;
use salon_core::store::AdminUserStore;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::context::ClientContext;
use crate::models::{LoginRequest, LoginResponse, PublicProfile};
use crate::services::auth;

/// `POST /admin/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    client: ClientContext,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let key = format!(
        "{}|{}",
        client.ip_or_unknown(),
        normalize_email(body.email.as_deref().unwrap_or_default())
    );
    if !state.login_limiter.allow(&key).await {
        warn!(ip = client.ip_or_unknown(), "login rate limit exceeded");
        return Err(AppError::RateLimited(
            "Too many login attempts, please try again later".into(),
        ));
    }

    let resp = auth::login(
        state.users.as_ref(),
        &state.config,
        body.email.as_deref(),
        body.password.as_deref(),
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /admin/me`: profile of the authenticated caller.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<PublicProfile>> {
    let record = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;
    Ok(Json(PublicProfile::from(&record)))
}
