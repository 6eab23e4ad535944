//! SHA-256 compatibility derivation
//!
//! One unsalted hash over the UTF-8 password bytes; the digest is the key.
//! Every published asset depends on this staying exactly as it is.

use sha2::{Digest, Sha256};

use super::derived_key::{DerivedKey, KEY_LEN};

/// Derive the 32-byte corpus key from a password.
///
/// Empty passwords are accepted here; rejecting them is caller policy
/// (see [`crate::PasswordPolicy`]).
pub fn derive_key_sha256(password: &str) -> DerivedKey {
    let digest = Sha256::digest(password.as_bytes());
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    DerivedKey::from_password_digest(bytes)
}

/// Hex SHA-256 of the password, as printed by the producer
pub fn password_hash_hex(password: &str) -> String {
    derive_key_sha256(password).fingerprint()
}
