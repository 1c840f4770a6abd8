//! API server configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use salon_core::auth::jwt::{DEFAULT_ACCESS_TOKEN_TTL_DAYS, resolve_access_ttl, resolve_jwt_secret};
use salon_core::auth::password::{DEFAULT_BCRYPT_COST, checked_cost};
use salon_core::auth::policy::PasswordPolicy;
use tracing::warn;

/// Configuration for the API server.
///
/// Loaded once at startup and shared read-only through `AppState`.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued access tokens.
    pub access_token_ttl: chrono::Duration,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: u32,
    pub password_policy: PasswordPolicy,
    /// Login attempts allowed per key within `login_rate_window`.
    pub login_rate_limit: usize,
    pub login_rate_window: Duration,
    /// Take the client address from `X-Forwarded-For` instead of the socket
    /// peer. Only safe behind a reverse proxy that overwrites the header.
    pub trust_proxy_headers: bool,
    /// Directory uploaded service images are written to.
    pub upload_dir: PathBuf,
    /// Per-file upload ceiling in bytes.
    pub max_upload_bytes: usize,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("pg_connection_url", &self.pg_connection_url)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("password_policy", &self.password_policy)
            .field("login_rate_limit", &self.login_rate_limit)
            .field("login_rate_window", &self.login_rate_window)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// Default per-file upload ceiling: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Maximum number of images attached to one service.
pub const MAX_SERVICE_IMAGES: usize = 5;

impl ApiConfig {
    /// Configuration with defaults for everything but the signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".into(),
            pg_connection_url: "postgres://localhost:5432/salon".into(),
            jwt_secret: jwt_secret.into(),
            access_token_ttl: chrono::Duration::days(DEFAULT_ACCESS_TOKEN_TTL_DAYS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            password_policy: PasswordPolicy::default(),
            login_rate_limit: 10,
            login_rate_window: Duration::from_secs(15 * 60),
            trust_proxy_headers: false,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                              |
    /// |--------------------------|--------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:5000`                     |
    /// | `DATABASE_URL`           | `postgres://localhost:5432/salon`    |
    /// | `JWT_ACCESS_SECRET` / `JWT_SECRET` | generated & persisted to file |
    /// | `JWT_ACCESS_EXPIRY`      | `7d`                                 |
    /// | `BCRYPT_COST`            | `12` (must be 4..=31)                |
    /// | `PASSWORD_MIN_LENGTH`    | `8`                                  |
    /// | `LOGIN_RATE_LIMIT`       | `10`                                 |
    /// | `LOGIN_RATE_WINDOW_SECS` | `900`                                |
    /// | `TRUST_PROXY_HEADERS`    | `false`                              |
    /// | `UPLOAD_DIR`             | `uploads`                            |
    /// | `MAX_UPLOAD_BYTES`       | `5242880`                            |
    pub fn from_env() -> Self {
        let defaults = Self::with_secret(String::new());
        let password_policy = PasswordPolicy {
            min_length: env_or("PASSWORD_MIN_LENGTH", defaults.password_policy.min_length),
            ..defaults.password_policy.clone()
        };
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or(defaults.pg_connection_url),
            jwt_secret: resolve_jwt_secret(),
            access_token_ttl: resolve_access_ttl(),
            bcrypt_cost: checked_cost(env_or("BCRYPT_COST", defaults.bcrypt_cost)),
            password_policy,
            login_rate_limit: env_or("LOGIN_RATE_LIMIT", defaults.login_rate_limit),
            login_rate_window: Duration::from_secs(env_or(
                "LOGIN_RATE_WINDOW_SECS",
                defaults.login_rate_window.as_secs(),
            )),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }

    /// Request body ceiling for multipart service uploads.
    pub fn service_body_limit(&self) -> usize {
        self.max_upload_bytes
            .saturating_mul(MAX_SERVICE_IMAGES)
            .saturating_add(1024 * 1024)
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr + fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
