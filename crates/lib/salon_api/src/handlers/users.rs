//! User administration handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::Value;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::context::ClientContext;
use crate::models::{
    CreateUserRequest, CreatedUserResponse, ListUsersParams, UpdatedUserResponse,
    UserListResponse,
};
use crate::services::users;

/// `POST /admin/users`
pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    ClientContext(context): ClientContext,
    AppJson(body): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    let created = users::create_user(&state, &actor, body, context).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /admin/users?page&limit&search&sort`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Query(params): Query<ListUsersParams>,
) -> AppResult<Json<UserListResponse>> {
    actor.require_user_manager()?;
    let resp = users::list_users(state.users.as_ref(), &params).await?;
    Ok(Json(resp))
}

/// `PATCH /admin/users/{id}`
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ClientContext(context): ClientContext,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<UpdatedUserResponse>> {
    let updated = users::update_user(&state, &actor, &id, &body, context).await?;
    Ok(Json(updated))
}
