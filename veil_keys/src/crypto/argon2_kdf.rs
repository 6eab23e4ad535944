//! Argon2id derivation for corpora that opt into a slow KDF

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::derived_key::{DerivedKey, KEY_LEN};
use crate::error::{KeyError, Result};

/// Minimum corpus salt length accepted by Argon2
pub const MIN_SALT_LEN: usize = 8;

/// Argon2id configuration.
///
/// One salt covers the whole corpus because both sides must derive the
/// same key from the password alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Config {
    /// Iterations (time cost)
    pub time_cost: u32,
    /// Memory in KiB
    pub memory_cost_kib: u32,
    /// Parallelism
    pub parallelism: u32,
    /// Corpus salt (base64)
    #[serde(default)]
    pub salt: String,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            time_cost: 3,
            memory_cost_kib: 64 * 1024, // 64 MiB
            parallelism: 2,
            salt: String::new(),
        }
    }
}

impl Argon2Config {
    /// Default parameters with a fresh random salt
    pub fn with_random_salt() -> Result<Self> {
        Ok(Self::default().with_salt(&generate_salt()?))
    }

    /// Settings for weak devices
    pub fn low_memory() -> Self {
        Self {
            time_cost: 4,
            memory_cost_kib: 16 * 1024, // 16 MiB
            parallelism: 1,
            salt: String::new(),
        }
    }

    /// Settings for strong devices
    pub fn high_security() -> Self {
        Self {
            time_cost: 4,
            memory_cost_kib: 256 * 1024, // 256 MiB
            parallelism: 4,
            salt: String::new(),
        }
    }

    pub fn with_salt(mut self, salt: &[u8]) -> Self {
        self.salt = base64::engine::general_purpose::STANDARD.encode(salt);
        self
    }

    /// Decode and validate the corpus salt
    pub fn salt_bytes(&self) -> Result<Vec<u8>> {
        if self.salt.is_empty() {
            return Err(KeyError::MissingSalt);
        }
        let salt = base64::engine::general_purpose::STANDARD.decode(&self.salt)?;
        if salt.len() < MIN_SALT_LEN {
            return Err(KeyError::SaltTooShort {
                min: MIN_SALT_LEN,
                actual: salt.len(),
            });
        }
        Ok(salt)
    }
}

/// Derive the corpus key with Argon2id
pub fn derive_key_argon2(password: &str, config: &Argon2Config) -> Result<DerivedKey> {
    let salt = config.salt_bytes()?;

    let params = Params::new(
        config.memory_cost_kib,
        config.time_cost,
        config.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| KeyError::Crypto(format!("Invalid Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut output)
        .map_err(|e| KeyError::KeyDerivationFailed(e.to_string()))?;

    let key = DerivedKey::from_bytes(output);
    output.zeroize();
    Ok(key)
}

/// Generate a random 16-byte salt
pub fn generate_salt() -> Result<[u8; 16]> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt)
        .map_err(|e| KeyError::Crypto(format!("RNG failed: {}", e)))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> Argon2Config {
        Argon2Config {
            time_cost: 1,
            memory_cost_kib: 1024,
            parallelism: 1,
            salt: String::new(),
        }
        .with_salt(&[1u8; 16])
    }

    #[test]
    fn test_derive_deterministic() {
        let config = fast_config();
        let k1 = derive_key_argon2("test_password", &config).unwrap();
        let k2 = derive_key_argon2("test_password", &config).unwrap();
        assert_eq!(k1.expose(), k2.expose());
    }

    #[test]
    fn test_fingerprint_does_not_reveal_key() {
        let key = derive_key_argon2("tree2024", &fast_config()).unwrap();
        let raw = hex::encode(key.expose());

        assert_ne!(key.fingerprint(), raw);
        assert!(!key.matches_fingerprint(&raw));
        assert!(key.matches_fingerprint(&key.fingerprint()));
    }

    #[test]
    fn test_salt_changes_key() {
        let k1 = derive_key_argon2("pw", &fast_config()).unwrap();
        let k2 = derive_key_argon2("pw", &fast_config().with_salt(&[2u8; 16])).unwrap();
        assert_ne!(k1.expose(), k2.expose());
    }

    #[test]
    fn test_missing_salt_rejected() {
        let result = derive_key_argon2("pw", &Argon2Config::low_memory());
        assert!(matches!(result, Err(KeyError::MissingSalt)));
    }

    #[test]
    fn test_short_salt_rejected() {
        let config = fast_config().with_salt(&[1u8; 4]);
        assert!(matches!(
            config.salt_bytes(),
            Err(KeyError::SaltTooShort { min: 8, actual: 4 })
        ));
    }

    #[test]
    fn test_invalid_base64_salt() {
        let config = Argon2Config {
            salt: "!!not base64!!".into(),
            ..fast_config()
        };
        assert!(matches!(config.salt_bytes(), Err(KeyError::InvalidSalt(_))));
    }

    #[test]
    fn test_random_salt() {
        let a = Argon2Config::with_random_salt().unwrap();
        let b = Argon2Config::with_random_salt().unwrap();
        assert_eq!(a.salt_bytes().unwrap().len(), 16);
        assert_ne!(a.salt, b.salt);
    }
}
