//! First-run seeding of an administrator account.

use tracing::{debug, info};

use salon_core::models::admin_user::{NewAdminUser, Role, normalize_email};
use salon_core::store::AdminUserStore;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::services::auth;

pub const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Credentials for the seeded administrator.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BootstrapAdmin {
    /// Read `BOOTSTRAP_ADMIN_EMAIL`, `BOOTSTRAP_ADMIN_PASSWORD` and
    /// `BOOTSTRAP_ADMIN_NAME`. Both email and password must be set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?;
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?;
        let name = std::env::var("BOOTSTRAP_ADMIN_NAME")
            .ok()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());
        Some(Self {
            name,
            email,
            password,
        })
    }
}

/// Create an active `ADMIN` from `seed` when the store has no users yet.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(
    users: &dyn AdminUserStore,
    config: &ApiConfig,
    seed: &BootstrapAdmin,
) -> AppResult<bool> {
    if users.count().await? > 0 {
        debug!("users present, skipping bootstrap admin");
        return Ok(false);
    }

    let email = normalize_email(&seed.email);
    let name = seed.name.trim().to_string();
    if email.is_empty() || name.is_empty() {
        return Err(AppError::Validation(
            "Bootstrap admin needs a name and an email".into(),
        ));
    }
    config.password_policy.check(&seed.password)?;

    let password_hash = auth::hash_password(&seed.password, config.bcrypt_cost).await?;
    let user = users
        .insert(NewAdminUser {
            name,
            email,
            role: Role::Admin,
            password_hash,
            created_by_admin_id: None,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::store::MemoryStore;

    fn config() -> ApiConfig {
        ApiConfig {
            bcrypt_cost: 4,
            ..ApiConfig::with_secret("bootstrap")
        }
    }

    fn seed(password: &str) -> BootstrapAdmin {
        BootstrapAdmin {
            name: DEFAULT_ADMIN_NAME.into(),
            email: " Root@Salon.test ".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn seeds_only_an_empty_store() {
        let store = MemoryStore::new();
        assert!(ensure_admin(&store, &config(), &seed("Root1234!")).await.unwrap());
        assert!(!ensure_admin(&store, &config(), &seed("Root1234!")).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        let record = store
            .find_by_email_with_password("root@salon.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.user.role, Role::Admin);
        assert!(record.user.status.is_active());
        assert_eq!(record.user.created_by_admin_id, None);
    }

    #[tokio::test]
    async fn weak_password_is_refused() {
        let store = MemoryStore::new();
        let err = ensure_admin(&store, &config(), &seed("weak")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", seed("Root1234!"));
        assert!(!rendered.contains("Root1234!"));
    }
}
