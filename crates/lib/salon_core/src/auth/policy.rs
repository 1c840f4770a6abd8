//! Password strength rules applied when an account is created.

use super::AuthError;

/// Configurable password strength rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_digit: bool,
    /// Requires at least one ASCII punctuation character.
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password, returning the first violated rule.
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::ValidationError(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        let mut missing = Vec::new();
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            missing.push("one uppercase letter");
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            missing.push("one lowercase letter");
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            missing.push("one number");
        }
        if self.require_special && !password.chars().any(|c| c.is_ascii_punctuation()) {
            missing.push("one special character");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::ValidationError(format!(
                "Password must contain at least {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), AuthError>) -> String {
        match result {
            Err(AuthError::ValidationError(m)) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn default_policy_accepts_strong_password() {
        assert!(PasswordPolicy::default().check("Abcd123!").is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let msg = message(PasswordPolicy::default().check("Ab1!"));
        assert_eq!(msg, "Password must be at least 8 characters");
    }

    #[test]
    fn lists_every_missing_class() {
        let msg = message(PasswordPolicy::default().check("abcdefgh"));
        assert_eq!(
            msg,
            "Password must contain at least one uppercase letter, one number, one special character"
        );
    }

    #[test]
    fn relaxed_policy_only_checks_length() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_lowercase: false,
            require_uppercase: false,
            require_digit: false,
            require_special: false,
        };
        assert!(policy.check("aaaa").is_ok());
        assert!(policy.check("aaa").is_err());
    }
}
