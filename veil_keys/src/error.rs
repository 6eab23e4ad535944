//! Error types for Veil Keys

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Argon2id derivation requires a corpus salt")]
    MissingSalt,

    #[error("Salt too short: expected at least {min} bytes, got {actual}")]
    SaltTooShort { min: usize, actual: usize },

    #[error("Invalid base64 salt: {0}")]
    InvalidSalt(#[from] base64::DecodeError),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Policy violation: {0}")]
    PolicyViolation(String),
}

pub type Result<T> = std::result::Result<T, KeyError>;

impl KeyError {
    /// Errors caused by configuration rather than by the password itself
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSalt | Self::SaltTooShort { .. } | Self::InvalidSalt(_)
        )
    }

    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation(_))
    }
}
