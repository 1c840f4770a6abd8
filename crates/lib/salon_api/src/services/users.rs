//! User administration: create, list and update admin-managed accounts.

use serde_json::{Map, Value, json};
use tracing::info;
use uuid::Uuid;

use salon_core::models::admin_user::{
    EMAIL_MAX_LEN, NAME_MAX_LEN, NewAdminUser, Role, UserListQuery, UserPatch, UserSort,
    UserStatus, normalize_email,
};
use salon_core::models::audit::{AuditAction, NewAuditEntry, RequestContext};
use salon_core::store::AdminUserStore;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CreateUserRequest, CreatedUserResponse, ListUsersParams, UpdatedUserResponse, UserListItem,
    UserListResponse,
};
use crate::services::{audit, auth};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Keys a patch may carry.
const EDITABLE_FIELDS: [&str; 3] = ["name", "role", "status"];

/// Keys that exist on the record but are never editable through a patch.
const PROTECTED_FIELDS: [&str; 4] = ["email", "password", "password_hash", "created_by_admin_id"];

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Parse the leading integer of a query value (`"3"`, `" 3abc"`), like a
/// lenient form parser would.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().ok()
}

/// Resolve `(page, limit)` from raw query values.
pub fn page_window(page: Option<&str>, limit: Option<&str>) -> (i64, i64) {
    let page = page
        .and_then(parse_leading_int)
        .unwrap_or(DEFAULT_PAGE)
        .max(1);
    let limit = limit
        .and_then(parse_leading_int)
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    (page, limit)
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_role(raw: &str) -> AppResult<Role> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid role value".into()))
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Reject any key outside the editable allow-list, naming the offending field.
pub fn check_patch_keys(body: &Map<String, Value>) -> AppResult<()> {
    for key in body.keys() {
        if PROTECTED_FIELDS.contains(&key.as_str()) {
            return Err(AppError::Validation(format!(
                "Field \"{key}\" is not editable"
            )));
        }
        if !EDITABLE_FIELDS.contains(&key.as_str()) {
            return Err(AppError::Validation(format!("Field \"{key}\" is not allowed")));
        }
    }
    Ok(())
}

/// Build a typed patch from an allow-listed body. `null` values count as absent.
pub fn parse_patch(body: &Map<String, Value>) -> AppResult<UserPatch> {
    let mut patch = UserPatch::default();

    match body.get("role") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => patch.role = Some(parse_role(raw)?),
        Some(_) => return Err(AppError::Validation("Invalid role value".into())),
    }

    match body.get("status") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => {
            let status = raw
                .parse::<UserStatus>()
                .map_err(|_| AppError::Validation("Invalid status value".into()))?;
            patch.status = Some(status);
        }
        Some(_) => return Err(AppError::Validation("Invalid status value".into())),
    }

    match body.get("name") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => patch.name = Some(validate_name(raw)?),
        Some(_) => return Err(AppError::Validation("Name must be a string".into())),
    }

    Ok(patch)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create an account on behalf of `actor`.
pub async fn create_user(
    state: &AppState,
    actor: &AuthenticatedUser,
    body: CreateUserRequest,
    context: RequestContext,
) -> AppResult<CreatedUserResponse> {
    actor.require_user_manager()?;

    let (Some(name), Some(email), Some(role), Some(password)) = (
        required(body.name.as_deref()),
        required(body.email.as_deref()),
        required(body.role.as_deref()),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Missing required fields: name, email, role, password".into(),
        ));
    };

    let email = normalize_email(email);
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Email must be at most {EMAIL_MAX_LEN} characters"
        )));
    }
    let name = validate_name(name)?;
    let role = parse_role(role)?;
    actor.require_may_manage_role(role)?;
    state.config.password_policy.check(password)?;

    // Fast path only; the unique index decides under concurrent creates.
    if state.users.email_exists(&email).await? {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = auth::hash_password(password, state.config.bcrypt_cost).await?;

    let user = state
        .users
        .insert(NewAdminUser {
            name,
            email,
            role,
            password_hash,
            created_by_admin_id: Some(actor.user_id),
        })
        .await?;

    info!(actor = %actor.user_id, user_id = %user.id, role = %user.role, "admin user created");

    audit::record(
        state.audit.as_ref(),
        NewAuditEntry {
            action: AuditAction::AdminCreatedUser,
            actor_admin_id: actor.user_id,
            target_id: Some(user.id),
            metadata: json!({
                "name": user.name,
                "email": user.email,
                "role": user.role,
                "status": user.status,
            }),
            context,
        },
    )
    .await;

    Ok(CreatedUserResponse::from(&user))
}

/// List accounts with paging, search and ordering.
pub async fn list_users(
    users: &dyn AdminUserStore,
    params: &ListUsersParams,
) -> AppResult<UserListResponse> {
    let (page, limit) = page_window(params.page.as_deref(), params.limit.as_deref());
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let query = UserListQuery {
        search,
        sort: UserSort::parse_lenient(params.sort.as_deref()),
        offset: (page - 1).saturating_mul(limit),
        limit,
    };
    let result = users.list(&query).await?;

    Ok(UserListResponse {
        page,
        limit,
        total: result.total,
        results: result.users.into_iter().map(UserListItem::from).collect(),
    })
}

/// Apply an allow-listed partial update to `target_id`.
pub async fn update_user(
    state: &AppState,
    actor: &AuthenticatedUser,
    target_id: &str,
    body: &Value,
    context: RequestContext,
) -> AppResult<UpdatedUserResponse> {
    actor.require_user_manager()?;

    let body = body
        .as_object()
        .ok_or_else(|| AppError::Validation("Request body must be a JSON object".into()))?;
    check_patch_keys(body)?;

    let not_found = || AppError::NotFound("User not found".into());
    let target_id: Uuid = salon_core::uuid::parse_id(target_id).ok_or_else(not_found)?;
    let before = state
        .users
        .find_by_id(target_id)
        .await?
        .ok_or_else(not_found)?;

    let patch = parse_patch(body)?;
    actor.require_may_manage_role(before.role)?;
    if let Some(role) = patch.role {
        actor.require_may_manage_role(role)?;
    }

    let after = state
        .users
        .update(target_id, &patch)
        .await?
        .ok_or_else(not_found)?;

    info!(actor = %actor.user_id, user_id = %after.id, "admin user updated");

    audit::record(
        state.audit.as_ref(),
        NewAuditEntry {
            action: AuditAction::AdminUpdatedUser,
            actor_admin_id: actor.user_id,
            target_id: Some(after.id),
            metadata: json!({
                "before": { "name": before.name, "role": before.role, "status": before.status },
                "after": { "name": after.name, "role": after.role, "status": after.status },
            }),
            context,
        },
    )
    .await;

    Ok(UpdatedUserResponse::from(&after))
}
