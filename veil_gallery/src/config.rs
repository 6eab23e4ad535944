//! Veil Gallery - Configuration
//!
//! Producer and loader settings, persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use veil_keys::KdfConfig;

use crate::error::{GalleryError, GalleryResult};

/// Extensions the loader probes by default
pub const DEFAULT_LOADER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Extensions the producer picks up from the input directory
pub const DEFAULT_PRODUCER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

/// Suffix appended to every encrypted file name
pub const ENCRYPTED_SUFFIX: &str = ".enc";

fn to_strings(extensions: &[&str]) -> Vec<String> {
    extensions.iter().map(|e| e.to_string()).collect()
}

/// Strip a leading dot and lowercase, so ".JPG" and "jpg" compare equal
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRODUCER
// ═══════════════════════════════════════════════════════════════════════════════

/// Producer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Directory holding plaintext images
    pub input_dir: PathBuf,
    /// Directory receiving `<name>.enc` files
    pub output_dir: PathBuf,
    /// Image extensions to encrypt (without dot)
    pub extensions: Vec<String>,
    /// Key derivation scheme
    pub kdf: KdfConfig,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./images"),
            output_dir: PathBuf::from("./images-encrypted"),
            extensions: to_strings(DEFAULT_PRODUCER_EXTENSIONS),
            kdf: KdfConfig::Sha256,
        }
    }
}

impl ProducerConfig {
    pub fn validate(&self) -> GalleryResult<()> {
        if self.extensions.is_empty() {
            return Err(GalleryError::Config("no image extensions configured".into()));
        }
        Ok(())
    }

    /// Whether a file name carries one of the configured extensions
    pub fn accepts(&self, file_name: &str) -> bool {
        let extension = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => normalize_extension(ext),
            None => return false,
        };
        self.extensions
            .iter()
            .any(|e| normalize_extension(e) == extension)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GalleryResult<Self> {
        load_json(path.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> GalleryResult<()> {
        save_json(self, path.as_ref())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADER
// ═══════════════════════════════════════════════════════════════════════════════

/// Batch loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory path or URL prefix holding `<index>.<ext>.enc` files
    pub image_dir: String,
    /// Extensions to probe per index
    pub extensions: Vec<String>,
    /// Highest index probed (indices start at 1)
    pub max_count: usize,
    /// Fetches in flight; 1 keeps the loader strictly sequential
    pub concurrency: usize,
    /// Per-request timeout for HTTP fetches
    pub timeout_secs: u64,
    /// Key derivation scheme
    pub kdf: KdfConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            image_dir: "./images".into(),
            extensions: to_strings(DEFAULT_LOADER_EXTENSIONS),
            max_count: 200,
            concurrency: 1,
            timeout_secs: 30,
            kdf: KdfConfig::Sha256,
        }
    }
}

impl LoaderConfig {
    pub fn with_image_dir(image_dir: impl Into<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> GalleryResult<()> {
        if self.extensions.is_empty() {
            return Err(GalleryError::Config("no extensions to probe".into()));
        }
        if self.max_count == 0 {
            return Err(GalleryError::Config("max_count must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(GalleryError::Config("concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// Total number of candidates the loader will probe
    pub fn candidate_count(&self) -> usize {
        self.max_count * self.extensions.len()
    }

    /// True when `image_dir` is an HTTP(S) prefix rather than a local path
    pub fn is_remote(&self) -> bool {
        let dir = self.image_dir.to_ascii_lowercase();
        dir.starts_with("http://") || dir.starts_with("https://")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GalleryResult<Self> {
        load_json(path.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> GalleryResult<()> {
        save_json(self, path.as_ref())
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> GalleryResult<T> {
    let data = std::fs::read(path)
        .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_slice(&data)?)
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> GalleryResult<()> {
    let data = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, data)?;
    Ok(())
}
