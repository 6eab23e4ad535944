//! # Veil Keys - Password Key Derivation
//!
//! ## Scope:
//! - Compatibility derivation: a single SHA-256 pass over the password
//! - Optional Argon2id derivation for new deployments
//! - Password fingerprints for producer/consumer cross-checks
//! - Caller-side password policy
//!
//! Both the gallery producer and the gallery consumer derive keys through
//! this crate, so the output must stay bit-identical across releases.

pub mod error;
pub mod crypto;
pub mod policy;

// Re-exports
pub use error::{KeyError, Result};
pub use crypto::{
    derive_key, derive_key_argon2, derive_key_sha256, password_hash_hex, Argon2Config,
    DerivedKey, KdfConfig, KEY_LEN,
};
pub use policy::PasswordPolicy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// System name
pub const SYSTEM_NAME: &str = "VEIL_KEYS";
