//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_ADMIN_LOGIN: &str = "/admin/login";
pub const GET_ADMIN_ME: &str = "/admin/me";

pub const ADMIN_USERS: &str = "/admin/users";
pub const PATCH_ADMIN_USERS_ID: &str = "/admin/users/{id}";

pub const GET_ADMIN_AUDIT_LOGS: &str = "/admin/audit-logs";

pub const POST_ADMIN_SERVICES: &str = "/admin/services";
pub const DELETE_ADMIN_SERVICES_ID: &str = "/admin/services/{id}";
pub const GET_SERVICES: &str = "/services";
pub const GET_SERVICES_ID: &str = "/services/{id}";

/// Mount point for uploaded images; also the prefix of stored image paths.
pub const UPLOADS: &str = "/uploads";
