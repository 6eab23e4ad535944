//! Veil Gallery - Cryptographic Core
//!
//! AES-256-CBC with PKCS#7 padding under a password-derived key.

pub mod keys;
pub mod cbc;

pub use keys::*;
pub use self::cbc::*;
