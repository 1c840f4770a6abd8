//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{AdminUserStore, AuditLog, ServiceCatalog, StoreError, StoreResult, escape_like};
use crate::models::admin_user::{
    AdminUser, AdminUserWithPassword, NewAdminUser, UserListQuery, UserPage, UserPatch, UserSort,
};
use crate::models::audit::{AuditLogEntry, NewAuditEntry};
use crate::models::service::{NewService, PricingTier, Service};
use crate::uuid::uuidv7;

const USER_COLUMNS: &str =
    "id, name, email, role, status, created_by_admin_id, created_at, updated_at";

const SERVICE_COLUMNS: &str =
    "id, name, category, description, duration, pricing, images, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    status: String,
    created_by_admin_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = StoreError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("admin_users.role: {e}")))?;
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("admin_users.status: {e}")))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            status,
            created_by_admin_id: row.created_by_admin_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserAuthRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    action: String,
    actor_admin_id: Uuid,
    target_id: Option<Uuid>,
    metadata: serde_json::Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = row
            .action
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("audit_logs.action: {e}")))?;
        Ok(Self {
            id: row.id,
            action,
            actor_admin_id: row.actor_admin_id,
            target_id: row.target_id,
            metadata: row.metadata,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    category: String,
    description: String,
    duration: String,
    pricing: Json<Vec<PricingTier>>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            duration: row.duration,
            pricing: row.pricing.0,
            images: row.images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Map a unique-constraint violation to [`StoreError::Duplicate`].
fn map_unique(e: sqlx::Error, field: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(field.to_string())
        }
        _ => StoreError::Db(e),
    }
}

// =============================================================================
// Store
// =============================================================================

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AdminUserStore for PgStore {
    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> StoreResult<Option<AdminUserWithPassword>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM admin_users WHERE email = $1");
        let row = sqlx::query_as::<_, AdminUserAuthRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| -> StoreResult<AdminUserWithPassword> {
            Ok(AdminUserWithPassword {
                user: r.user.try_into()?,
                password_hash: r.password_hash,
            })
        })
        .transpose()
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admin_users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<AdminUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = $1");
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, user: NewAdminUser) -> StoreResult<AdminUser> {
        let sql = format!(
            "INSERT INTO admin_users (id, name, email, password_hash, role, status, created_by_admin_id) \
             VALUES ($1, $2, $3, $4, $5, 'ACTIVE', $6) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(uuidv7())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.created_by_admin_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "email"))?;
        row.try_into()
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<AdminUser>> {
        let sql = format!(
            "UPDATE admin_users SET \
               name = COALESCE($2, name), \
               role = COALESCE($3, role), \
               status = COALESCE($4, status), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.role.map(|r| r.as_str()))
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, query: &UserListQuery) -> StoreResult<UserPage> {
        let pattern = query
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));
        let filter = "($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)";
        let order = match query.sort {
            UserSort::Newest => "created_at DESC, id DESC",
            UserSort::Oldest => "created_at ASC, id ASC",
        };

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM admin_users WHERE {filter}"
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM admin_users WHERE {filter} \
             ORDER BY {order} OFFSET $2 LIMIT $3"
        ))
        .bind(pattern.as_deref())
        .bind(query.offset)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(UserPage { total, users })
    }

    async fn count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append(&self, entry: NewAuditEntry) -> StoreResult<AuditLogEntry> {
        let row = sqlx::query_as::<_, AuditRow>(
            r#"
            INSERT INTO audit_logs (id, action, actor_admin_id, target_id, metadata, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, action, actor_admin_id, target_id, metadata, ip_address, user_agent, created_at
            "#,
        )
        .bind(uuidv7())
        .bind(entry.action.as_str())
        .bind(entry.actor_admin_id)
        .bind(entry.target_id)
        .bind(&entry.metadata)
        .bind(entry.context.ip_address.as_deref())
        .bind(entry.context.user_agent.as_deref())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, action, actor_admin_id, target_id, metadata, ip_address, user_agent, created_at \
             FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl ServiceCatalog for PgStore {
    async fn insert(&self, service: NewService) -> StoreResult<Service> {
        let sql = format!(
            "INSERT INTO services (id, name, category, description, duration, pricing, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {SERVICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(uuidv7())
            .bind(&service.name)
            .bind(&service.category)
            .bind(&service.description)
            .bind(&service.duration)
            .bind(Json(&service.pricing))
            .bind(&service.images)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Service>> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let sql = format!("DELETE FROM services WHERE id = $1 RETURNING {SERVICE_COLUMNS}");
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}
