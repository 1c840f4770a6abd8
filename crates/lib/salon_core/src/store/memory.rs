//! In-process store.
//!
//! Enforces the same invariants as the PostgreSQL schema (unique email,
//! newest-first ordering) so handlers behave identically on either backend.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AdminUserStore, AuditLog, ServiceCatalog, StoreError, StoreResult};
use crate::models::admin_user::{
    AdminUser, AdminUserWithPassword, NewAdminUser, UserListQuery, UserPage, UserPatch, UserSort,
    UserStatus,
};
use crate::models::audit::{AuditLogEntry, NewAuditEntry};
use crate::models::service::{NewService, Service};
use crate::uuid::uuidv7;

/// Store that keeps all records in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<AdminUserWithPassword>>,
    audit: RwLock<Vec<AuditLogEntry>>,
    services: RwLock<Vec<Service>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(user: &AdminUser, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
}

#[async_trait]
impl AdminUserStore for MemoryStore {
    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> StoreResult<Option<AdminUserWithPassword>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.user.email == email))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AdminUser>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user.id == id).map(|u| u.user.clone()))
    }

    async fn insert(&self, user: NewAdminUser) -> StoreResult<AdminUser> {
        if user.password_hash.is_empty() {
            return Err(StoreError::DataCorruption(
                "admin_users.password_hash must not be empty".into(),
            ));
        }
        // Check and push under one write lock so concurrent inserts cannot both pass.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.email == user.email) {
            return Err(StoreError::Duplicate("email".into()));
        }
        let now = Utc::now();
        let record = AdminUser {
            id: uuidv7(),
            name: user.name,
            email: user.email,
            role: user.role,
            status: UserStatus::Active,
            created_by_admin_id: user.created_by_admin_id,
            created_at: now,
            updated_at: now,
        };
        users.push(AdminUserWithPassword {
            user: record.clone(),
            password_hash: user.password_hash,
        });
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<AdminUser>> {
        let mut users = self.users.write().await;
        let Some(stored) = users.iter_mut().find(|u| u.user.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            stored.user.name = name.clone();
        }
        if let Some(role) = patch.role {
            stored.user.role = role;
        }
        if let Some(status) = patch.status {
            stored.user.status = status;
        }
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn list(&self, query: &UserListQuery) -> StoreResult<UserPage> {
        let users = self.users.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matched: Vec<AdminUser> = users
            .iter()
            .map(|u| &u.user)
            .filter(|u| needle.as_deref().is_none_or(|n| matches_search(u, n)))
            .cloned()
            .collect();

        // Stable sort: equal timestamps keep insertion order.
        matched.sort_by_key(|u| u.created_at);
        if query.sort == UserSort::Newest {
            matched.reverse();
        }

        let total = matched.len() as i64;
        let users = matched
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok(UserPage { total, users })
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn append(&self, entry: NewAuditEntry) -> StoreResult<AuditLogEntry> {
        let record = AuditLogEntry::from_new(uuidv7(), entry, Utc::now());
        self.audit.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLogEntry>> {
        let audit = self.audit.read().await;
        Ok(audit
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ServiceCatalog for MemoryStore {
    async fn insert(&self, service: NewService) -> StoreResult<Service> {
        let now = Utc::now();
        let record = Service {
            id: uuidv7(),
            name: service.name,
            category: service.category,
            description: service.description,
            duration: service.duration,
            pricing: service.pricing,
            images: service.images,
            created_at: now,
            updated_at: now,
        };
        self.services.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Service>> {
        let services = self.services.read().await;
        Ok(services
            .iter()
            .rev()
            .filter(|s| category.is_none_or(|c| s.category == c))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let services = self.services.read().await;
        Ok(services.iter().find(|s| s.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let mut services = self.services.write().await;
        let removed = services
            .iter()
            .position(|s| s.id == id)
            .map(|idx| services.remove(idx));
        Ok(removed)
    }
}
