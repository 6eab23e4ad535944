//! Password policy - caller-side rules applied before any derivation
//!
//! Key derivation itself accepts every string. Tools that take a password
//! from an operator run it through a policy first.

use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result};

/// Password acceptance rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum length in characters
    pub min_length: usize,

    /// Reject passwords made only of whitespace
    pub reject_blank: bool,

    /// Require at least one digit
    pub require_digits: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 1,
            reject_blank: true,
            require_digits: false,
        }
    }
}

impl PasswordPolicy {
    /// Stricter rules for new corpora
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            reject_blank: true,
            require_digits: true,
        }
    }

    /// Check a password against the policy, returning every violation
    pub fn validate_password(&self, password: &str) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.reject_blank && password.trim().is_empty() {
            errors.push("Password must not be empty".to_string());
        }

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }

        if self.require_digits && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Same as [`validate_password`](Self::validate_password), folded into a `KeyError`
    pub fn enforce(&self, password: &str) -> Result<()> {
        self.validate_password(password)
            .map_err(|errors| KeyError::PolicyViolation(errors.join("; ")))
    }
}
