//! Persistence seams.
//!
//! The API layer talks to storage only through these traits. `postgres`
//! backs them with `sqlx`; `memory` keeps everything in process and is used
//! by the test suites and for local runs without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::admin_user::{
    AdminUser, AdminUserWithPassword, NewAdminUser, UserListQuery, UserPage, UserPatch,
};
use crate::models::audit::{AuditLogEntry, NewAuditEntry};
use crate::models::service::{NewService, Service};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the offending field.
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    #[error("Data corruption: {0}")]
    DataCorruption(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted admin-user records.
#[async_trait]
pub trait AdminUserStore: Send + Sync {
    /// Fetch a user and their password hash by normalized email.
    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> StoreResult<Option<AdminUserWithPassword>>;

    /// Check whether a normalized email is already registered.
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AdminUser>>;

    /// Insert a new user. Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: NewAdminUser) -> StoreResult<AdminUser>;

    /// Apply a partial update. Returns `None` when the user does not exist.
    async fn update(&self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<AdminUser>>;

    async fn list(&self, query: &UserListQuery) -> StoreResult<UserPage>;

    async fn count(&self) -> StoreResult<i64>;

    /// Cheap reachability check for health checks.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: NewAuditEntry) -> StoreResult<AuditLogEntry>;

    /// Most recent entries first.
    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLogEntry>>;
}

/// Salon services offered to customers.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn insert(&self, service: NewService) -> StoreResult<Service>;

    /// Newest first, optionally restricted to one category.
    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Service>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Service>>;

    /// Remove a service, returning the removed record.
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Service>>;
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
