//! Crypto module - key derivation (SHA-256 compatibility, Argon2id)

mod argon2_kdf;
mod derived_key;
mod sha256_kdf;

pub use argon2_kdf::{derive_key_argon2, generate_salt, Argon2Config};
pub use derived_key::{DerivedKey, KEY_LEN};
pub use sha256_kdf::{derive_key_sha256, password_hash_hex};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key derivation selected for a corpus.
///
/// `Sha256` is the compatibility scheme every existing asset was produced
/// with: one unsalted hash pass, no stretching. It resists nothing beyond
/// casual viewing; a leaked corpus can be brute-forced offline at hash speed.
/// `Argon2id` is opt-in for new corpora and cannot read `Sha256` assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KdfConfig {
    #[default]
    Sha256,
    Argon2id(Argon2Config),
}

impl KdfConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Argon2id(_) => "Argon2id",
        }
    }

    /// True for the unstretched compatibility scheme
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Sha256)
    }
}

/// Derive the corpus key from a password using the configured scheme
pub fn derive_key(password: &SecretString, kdf: &KdfConfig) -> Result<DerivedKey> {
    tracing::debug!(kdf = kdf.name(), "deriving corpus key");

    match kdf {
        KdfConfig::Sha256 => Ok(derive_key_sha256(password.expose_secret())),
        KdfConfig::Argon2id(config) => derive_key_argon2(password.expose_secret(), config),
    }
}
