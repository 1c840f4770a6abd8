//! JWT token generation and verification.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::models::admin_user::Role;
use crate::models::auth::TokenClaims;

/// Default access token lifetime, in days.
pub const DEFAULT_ACCESS_TOKEN_TTL_DAYS: i64 = 7;

/// Generate a signed JWT access token (HS256).
pub fn generate_access_token(
    user_id: Uuid,
    role: Role,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a JWT access token, returning the claims on success.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Parse a token lifetime such as `7d`, `12h`, `30m`, `45s` or bare seconds.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: i64 = digits.parse().ok()?;
    if value <= 0 {
        return None;
    }
    match unit {
        "s" => Some(Duration::seconds(value)),
        "m" => Some(Duration::minutes(value)),
        "h" => Some(Duration::hours(value)),
        "d" => Some(Duration::days(value)),
        "w" => Some(Duration::weeks(value)),
        _ => None,
    }
}

/// Resolve the access token lifetime from `JWT_ACCESS_EXPIRY`, defaulting to 7 days.
pub fn resolve_access_ttl() -> Duration {
    match std::env::var("JWT_ACCESS_EXPIRY") {
        Ok(raw) => parse_ttl(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "unparseable JWT_ACCESS_EXPIRY, using default");
            Duration::days(DEFAULT_ACCESS_TOKEN_TTL_DAYS)
        }),
        Err(_) => Duration::days(DEFAULT_ACCESS_TOKEN_TTL_DAYS),
    }
}

/// Resolve the JWT secret: env var `JWT_ACCESS_SECRET` → `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    secret_from_env().unwrap_or_else(|| load_or_create_secret(&jwt_secret_path()))
}

fn secret_from_env() -> Option<String> {
    ["JWT_ACCESS_SECRET", "JWT_SECRET"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|secret| !secret.is_empty())
}

fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Read the secret stored at `path`, or generate one and try to store it there.
///
/// A secret that cannot be written is still returned; tokens then stop
/// verifying after a restart, so the failure is logged.
pub fn load_or_create_secret(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(existing) if !existing.trim().is_empty() => return existing.trim().to_string(),
        Ok(_) => warn!(path = %path.display(), "JWT secret file is empty, regenerating"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "could not read JWT secret file: {e}"),
    }

    let secret = generate_secret();
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(dir = %parent.display(), "could not create JWT secret directory: {e}");
        }
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            "could not persist JWT secret, tokens will not survive a restart: {e}"
        ),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("salon")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn token_round_trip_carries_subject_and_role() {
        let id = Uuid::now_v7();
        let token = generate_access_token(id, Role::Manager, SECRET, Duration::hours(1)).unwrap();
        let claims = verify_access_token(&token, SECRET).expect("valid token");
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token =
            generate_access_token(Uuid::now_v7(), Role::Admin, SECRET, Duration::hours(1)).unwrap();
        assert!(verify_access_token(&token, b"other-secret").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s validation leeway.
        let token = generate_access_token(
            Uuid::now_v7(),
            Role::Admin,
            SECRET,
            Duration::minutes(-5),
        )
        .unwrap();
        assert!(verify_access_token(&token, SECRET).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_access_token("not.a.jwt", SECRET).is_none());
    }

    #[test]
    fn parse_ttl_units() {
        assert_eq!(parse_ttl("7d"), Some(Duration::days(7)));
        assert_eq!(parse_ttl("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_ttl("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_ttl("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_ttl("3600"), Some(Duration::seconds(3600)));
        assert_eq!(parse_ttl(" 2w "), Some(Duration::weeks(2)));
    }

    #[test]
    fn parse_ttl_rejects_nonsense() {
        assert_eq!(parse_ttl(""), None);
        assert_eq!(parse_ttl("d"), None);
        assert_eq!(parse_ttl("0d"), None);
        assert_eq!(parse_ttl("7 days"), None);
        assert_eq!(parse_ttl("-1h"), None);
    }

    #[test]
    fn secret_file_is_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt-secret");
        let first = load_or_create_secret(&path);
        assert_eq!(first.len(), 64);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(load_or_create_secret(&path), first);
    }

    #[test]
    fn blank_secret_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwt-secret");
        std::fs::write(&path, "  \n").unwrap();
        let secret = load_or_create_secret(&path);
        assert_eq!(secret.len(), 64);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), secret);
    }

    #[test]
    fn unwritable_location_still_yields_a_secret() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("jwt-secret");
        let secret = load_or_create_secret(&path);
        assert_eq!(secret.len(), 64);
        assert!(!path.exists());
    }
}
