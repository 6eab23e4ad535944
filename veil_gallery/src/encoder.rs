//! Veil Gallery - Producer Batch
//!
//! Encrypts every recognised image in a directory into
//! `<output_dir>/<original name>.enc`. A file that fails is logged and
//! recorded; only a missing input directory or bad configuration stops
//! the run.

use std::path::PathBuf;

use crate::asset_crypto::AssetCipher;
use crate::config::{ProducerConfig, ENCRYPTED_SUFFIX};
use crate::error::GalleryResult;
use crate::secure_fs::SecureFs;
use crate::Progress;

/// One file that could not be encrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeFailure {
    pub file: String,
    pub reason: String,
}

/// Outcome of a directory run
#[derive(Debug, Clone, Default)]
pub struct EncodeReport {
    /// Image files found in the input directory
    pub total: usize,
    /// Files encrypted and written
    pub succeeded: usize,
    /// Paths written, in processing order
    pub outputs: Vec<PathBuf>,
    /// Files that failed, in processing order
    pub failures: Vec<EncodeFailure>,
}

impl EncodeReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every discovered image was encrypted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Encrypted file name for a source file name
pub fn output_name(file_name: &str) -> String {
    format!("{}{}", file_name, ENCRYPTED_SUFFIX)
}

/// Encrypt all images under `config.input_dir`.
///
/// `progress` is called after each file as `(done, total, file_name)`.
pub fn encrypt_directory(
    config: &ProducerConfig,
    cipher: &AssetCipher,
    progress: Option<Progress<'_>>,
) -> GalleryResult<EncodeReport> {
    config.validate()?;

    let input = SecureFs::new(&config.input_dir);
    let files = input.list_images(&config.extensions)?;

    let output = SecureFs::new(&config.output_dir);
    output.ensure_root()?;

    log::info!(
        "Encrypting {} images from {} into {}",
        files.len(),
        config.input_dir.display(),
        config.output_dir.display()
    );

    let mut report = EncodeReport {
        total: files.len(),
        ..Default::default()
    };

    for (i, file) in files.iter().enumerate() {
        match encrypt_one(&input, &output, cipher, file) {
            Ok(path) => {
                log::info!("Encrypted {} -> {}", file, path.display());
                report.succeeded += 1;
                report.outputs.push(path);
            }
            Err(e) => {
                log::error!("Failed to encrypt {}: {}", file, e);
                report.failures.push(EncodeFailure {
                    file: file.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if let Some(callback) = progress {
            callback(i + 1, report.total, file.as_str());
        }
    }

    log::info!("Encrypted {}/{} images", report.succeeded, report.total);
    Ok(report)
}

fn encrypt_one(
    input: &SecureFs,
    output: &SecureFs,
    cipher: &AssetCipher,
    file: &str,
) -> GalleryResult<PathBuf> {
    let plaintext = input.read_file(file)?;
    let encrypted = cipher.encode(&plaintext)?;
    output.write_file(&output_name(file), &encrypted)
}
