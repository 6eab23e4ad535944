//! Derived corpus key with automatic zeroization

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};
use sha2::{Digest, Sha256};

/// Key length for AES-256
pub const KEY_LEN: usize = 32;

/// 32-byte symmetric key derived from the corpus password.
///
/// The bytes live in a `SecretBox` and are wiped on drop.
pub struct DerivedKey {
    inner: SecretBox<[u8; KEY_LEN]>,
    /// Key is the plain SHA-256 of the password, so its hex is already public
    password_digest: bool,
}

impl DerivedKey {
    /// Wrap key material whose fingerprint must not reveal the key
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            inner: SecretBox::new(Box::new(bytes)),
            password_digest: false,
        }
    }

    /// Wrap the SHA-256 digest of a password. The fingerprint is the key itself.
    pub(crate) fn from_password_digest(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            inner: SecretBox::new(Box::new(bytes)),
            password_digest: true,
        }
    }

    /// Build from a slice, rejecting anything that is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        let array: [u8; KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| crate::KeyError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self::from_bytes(array))
    }

    /// Expose the key bytes (use with caution)
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        self.inner.expose_secret()
    }

    fn fingerprint_bytes(&self) -> [u8; KEY_LEN] {
        if self.password_digest {
            *self.expose()
        } else {
            let mut digest = [0u8; KEY_LEN];
            digest.copy_from_slice(&Sha256::digest(self.expose()));
            digest
        }
    }

    /// Lowercase hex fingerprint for producer/consumer cross-checks.
    ///
    /// For the SHA-256 scheme this is the hex SHA-256 of the password, i.e.
    /// the key. Any other key is hashed once more so the published value
    /// cannot be used to decrypt.
    pub fn fingerprint(&self) -> String {
        hex::encode(self.fingerprint_bytes())
    }

    /// Compare against a hex fingerprint without early exit on the first
    /// mismatching byte
    pub fn matches_fingerprint(&self, expected_hex: &str) -> bool {
        let expected = match hex::decode(expected_hex.trim()) {
            Ok(bytes) if bytes.len() == KEY_LEN => bytes,
            _ => return false,
        };
        self.fingerprint_bytes()
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Clone for DerivedKey {
    fn clone(&self) -> Self {
        Self {
            inner: SecretBox::new(Box::new(*self.expose())),
            password_digest: self.password_digest,
        }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}
