//! # Veil Gallery
//!
//! Password-encrypted image assets for static galleries.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      VEIL GALLERY                        │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │   ENCODER   │   │ ASSET CRYPTO│   │  BATCH LOADER  │  │
//! │  │  dir → .enc │──▶│ IV ‖ AES-CBC│◀──│ probe + decode │  │
//! │  └──────┬──────┘   └──────┬──────┘   └───────┬────────┘  │
//! │         │                 │                  │           │
//! │  ┌──────┴─────────────────┴──────────────────┴────────┐  │
//! │  │                VEIL_KEYS INTEGRATION               │  │
//! │  │        SHA-256(password) → 32-byte AES key         │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Asset Format
//!
//! - `IV (16 bytes) ‖ AES-256-CBC ciphertext (PKCS#7 padded)`
//! - Fresh random IV per file
//! - Key is the SHA-256 digest of the shared password
//! - No authentication tag: a wrong password usually fails at unpadding,
//!   but not always

pub mod crypto;
pub mod asset_crypto;
pub mod config;
pub mod secure_fs;
pub mod encoder;
pub mod loader;
pub mod api;
pub mod error;

pub use error::{GalleryError, GalleryResult};
pub use asset_crypto::{decode, encode, AssetCipher, EncryptedAsset};
pub use config::{LoaderConfig, ProducerConfig};
pub use encoder::{encrypt_directory, EncodeReport};
pub use loader::{
    candidate_ids, found_only, BatchLoader, CancelFlag, Fetcher, FsFetcher, HttpFetcher,
    LoadOutcome,
};
pub use api::GalleryApi;

/// Progress callback: `(completed, total, current)`
pub type Progress<'a> = &'a (dyn Fn(usize, usize, &str) + Send + Sync);

/// Veil Gallery version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
