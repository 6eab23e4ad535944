//! Veil Gallery - Error Types

use thiserror::Error;

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Gallery error types
#[derive(Error, Debug)]
pub enum GalleryError {
    // ═══════════════════════════════════════════════════════════════
    // CRYPTO ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Malformed asset: {len} bytes is shorter than the 16-byte IV")]
    Framing { len: usize },

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key error: {0}")]
    Key(#[from] veil_keys::KeyError),

    // ═══════════════════════════════════════════════════════════════
    // TRANSPORT ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // ═══════════════════════════════════════════════════════════════
    // FILE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Input directory not found: {0}")]
    InputDirMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GalleryError {
    /// Buffer too short to hold an IV
    pub fn is_framing(&self) -> bool {
        matches!(self, GalleryError::Framing { .. })
    }

    /// Cipher or padding failure, usually a wrong password
    pub fn is_decryption(&self) -> bool {
        matches!(self, GalleryError::DecryptionFailed(_))
    }

    /// Fetch-side failures the loader treats as "no image at this slot"
    pub fn is_absence(&self) -> bool {
        matches!(self, GalleryError::NotFound(_) | GalleryError::Transport(_))
    }

    /// Errors that abort a whole run rather than a single item
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            GalleryError::InputDirMissing(_) | GalleryError::Config(_)
        ) || matches!(self, GalleryError::Key(e) if e.is_configuration())
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(e: serde_json::Error) -> Self {
        GalleryError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for GalleryError {
    fn from(e: reqwest::Error) -> Self {
        GalleryError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(GalleryError::Framing { len: 3 }.is_framing());
        assert!(GalleryError::DecryptionFailed("pad".into()).is_decryption());
        assert!(GalleryError::NotFound("1.jpg.enc".into()).is_absence());
        assert!(GalleryError::Transport("reset".into()).is_absence());
        assert!(!GalleryError::DecryptionFailed("pad".into()).is_absence());
    }

    #[test]
    fn test_fatal_to_run() {
        assert!(GalleryError::InputDirMissing("./images".into()).is_fatal_to_run());
        assert!(GalleryError::Key(veil_keys::KeyError::MissingSalt).is_fatal_to_run());
        assert!(!GalleryError::EncryptionFailed("x".into()).is_fatal_to_run());
    }

    #[test]
    fn test_framing_message() {
        let err = GalleryError::Framing { len: 5 };
        assert_eq!(
            err.to_string(),
            "Malformed asset: 5 bytes is shorter than the 16-byte IV"
        );
    }
}
