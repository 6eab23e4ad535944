//! Veil Gallery - Consumer API
//!
//! Single entry point for the viewing side: decrypt one buffer, fetch and
//! decrypt one asset, or scan a whole gallery.

use std::time::Duration;

use secrecy::SecretString;

use crate::asset_crypto::AssetCipher;
use crate::config::LoaderConfig;
use crate::error::GalleryResult;
use crate::loader::{found_only, BatchLoader, CancelFlag, Fetcher, FsFetcher, HttpFetcher, LoadOutcome};
use crate::Progress;

/// Consumer-side gallery handle
///
/// # Example
///
/// ```rust,ignore
/// use secrecy::SecretString;
/// use veil_gallery::{GalleryApi, LoaderConfig};
///
/// let password = SecretString::from("tree2024");
/// let api = GalleryApi::new(&password, LoaderConfig::with_image_dir("https://cdn.example/img"))?;
///
/// let images = api.scan_found(None).await?;
/// ```
pub struct GalleryApi {
    loader: BatchLoader<Box<dyn Fetcher>>,
    config: LoaderConfig,
    cancel: CancelFlag,
}

impl GalleryApi {
    // ═══════════════════════════════════════════════════════════════════════
    // INITIALIZATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Open a gallery. `http(s)://` prefixes are fetched over the network,
    /// anything else is read from disk.
    pub fn new(password: &SecretString, config: LoaderConfig) -> GalleryResult<Self> {
        let fetcher: Box<dyn Fetcher> = if config.is_remote() {
            Box::new(HttpFetcher::new(Duration::from_secs(config.timeout_secs))?)
        } else {
            Box::new(FsFetcher)
        };
        Self::with_fetcher(password, config, fetcher)
    }

    /// Open a gallery over a caller-supplied fetcher
    pub fn with_fetcher(
        password: &SecretString,
        config: LoaderConfig,
        fetcher: Box<dyn Fetcher>,
    ) -> GalleryResult<Self> {
        config.validate()?;
        let cipher = AssetCipher::with_kdf(password, &config.kdf)?;
        let cancel = CancelFlag::new();
        let loader = BatchLoader::new(fetcher, cipher)
            .with_concurrency(config.concurrency)
            .with_cancel(cancel.clone());

        Ok(Self {
            loader,
            config,
            cancel,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // KEY CHECKS
    // ═══════════════════════════════════════════════════════════════════════

    /// Hex fingerprint of the derived key, as printed by the producer
    pub fn fingerprint(&self) -> String {
        self.loader.cipher().fingerprint()
    }

    /// Compare against a published fingerprint before scanning
    pub fn check_password(&self, expected_hash_hex: &str) -> bool {
        self.loader.cipher().key().matches_fingerprint(expected_hash_hex)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ASSET OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Decrypt an `IV ‖ ciphertext` buffer already in memory
    pub fn decrypt_buffer(&self, buffer: &[u8]) -> GalleryResult<Vec<u8>> {
        self.loader.cipher().decode(buffer)
    }

    /// Fetch one asset from the configured source and decrypt it
    pub async fn fetch_and_decrypt(&self, url: &str) -> GalleryResult<Vec<u8>> {
        self.loader.load_one(url).await
    }

    /// Probe every candidate; one outcome per candidate, in candidate order
    pub async fn scan(&self, progress: Option<Progress<'_>>) -> GalleryResult<Vec<LoadOutcome>> {
        self.loader.load_all(&self.config, progress).await
    }

    /// [`scan`](Self::scan) keeping only recovered images
    pub async fn scan_found(&self, progress: Option<Progress<'_>>) -> GalleryResult<Vec<Vec<u8>>> {
        Ok(found_only(self.scan(progress).await?))
    }

    /// Stop a running scan; remaining candidates come back as `Skipped`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVENIENCE FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// One-shot scan with the default fetcher for `config.image_dir`
pub async fn load_all(
    password: &str,
    config: &LoaderConfig,
    progress: Option<Progress<'_>>,
) -> GalleryResult<Vec<LoadOutcome>> {
    let password = SecretString::from(password);
    GalleryApi::new(&password, config.clone())?.scan(progress).await
}
