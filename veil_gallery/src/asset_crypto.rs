//! Asset encryption module for Veil Gallery
//!
//! Format of an `.enc` file:
//! ```text
//! [IV 16B][random, fresh per encryption]
//! [CIPHERTEXT variable][AES-256-CBC, PKCS#7 padded]
//! ```
//!
//! No magic, no version byte, no length field, no MAC. The key is derived
//! from the corpus password alone, so producer and consumer only share the
//! password and this layout.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use secrecy::SecretString;
use veil_keys::{derive_key, derive_key_sha256, DerivedKey, KdfConfig};

use crate::crypto::{decrypt_cbc, encrypt_cbc, generate_iv, padded_len, IV_LEN};
use crate::error::{GalleryError, GalleryResult};

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Shortest buffer that can be split into IV and ciphertext
pub const MIN_ASSET_LEN: usize = IV_LEN;

/// Borrowed view of an encrypted asset: `IV || ciphertext`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedAsset<'a> {
    iv: [u8; IV_LEN],
    ciphertext: &'a [u8],
}

impl<'a> EncryptedAsset<'a> {
    /// Split a buffer into IV and ciphertext.
    ///
    /// Anything shorter than the IV is rejected before slicing.
    pub fn parse(buffer: &'a [u8]) -> GalleryResult<Self> {
        if buffer.len() < MIN_ASSET_LEN {
            return Err(GalleryError::Framing { len: buffer.len() });
        }

        let (iv, ciphertext) = buffer.split_at(IV_LEN);
        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| GalleryError::Framing { len: buffer.len() })?;

        Ok(Self { iv, ciphertext })
    }

    pub fn new(iv: [u8; IV_LEN], ciphertext: &'a [u8]) -> Self {
        Self { iv, ciphertext }
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }

    /// Serialize to bytes (IV || ciphertext)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        output.extend_from_slice(&self.iv);
        output.extend_from_slice(self.ciphertext);
        output
    }

    /// Size of the encoded asset for a plaintext of `plaintext_len` bytes
    pub fn encoded_len(plaintext_len: usize) -> usize {
        IV_LEN + padded_len(plaintext_len)
    }
}

// ---------------------------------------------------------------------------
// AssetCipher
// ---------------------------------------------------------------------------

/// Encrypts and decrypts assets under one corpus key.
///
/// Holds only the derived key; deriving once and reusing the cipher gives
/// the same bytes as deriving per call.
#[derive(Clone)]
pub struct AssetCipher {
    key: DerivedKey,
}

impl AssetCipher {
    pub fn new(key: DerivedKey) -> Self {
        Self { key }
    }

    /// Cipher keyed with the SHA-256 compatibility derivation
    pub fn from_password(password: &str) -> Self {
        Self::new(derive_key_sha256(password))
    }

    /// Cipher keyed with an explicit derivation scheme
    pub fn with_kdf(password: &SecretString, kdf: &KdfConfig) -> GalleryResult<Self> {
        Ok(Self::new(derive_key(password, kdf)?))
    }

    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    /// Hex fingerprint of the corpus key
    pub fn fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    /// Encrypt a plaintext under a fresh random IV
    pub fn encode(&self, plaintext: &[u8]) -> GalleryResult<Vec<u8>> {
        self.encode_with_iv(plaintext, &generate_iv())
    }

    /// Encrypt under a caller-chosen IV.
    ///
    /// Reusing an IV under the same key leaks equal plaintext prefixes;
    /// outside of tests use [`encode`](Self::encode).
    pub fn encode_with_iv(&self, plaintext: &[u8], iv: &[u8; IV_LEN]) -> GalleryResult<Vec<u8>> {
        let ciphertext = encrypt_cbc(self.key.expose(), iv, plaintext)?;
        Ok(EncryptedAsset::new(*iv, &ciphertext).to_bytes())
    }

    /// Decrypt an `IV || ciphertext` buffer
    pub fn decode(&self, buffer: &[u8]) -> GalleryResult<Vec<u8>> {
        let asset = EncryptedAsset::parse(buffer)?;
        decrypt_cbc(self.key.expose(), asset.iv(), asset.ciphertext())
    }

    /// Encrypt a file on disk
    ///
    /// # Returns
    /// Number of bytes written
    pub fn encrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> GalleryResult<usize> {
        let plaintext = fs::read(input_path.as_ref())?;
        let encrypted = self.encode(&plaintext)?;

        let mut file = File::create(output_path.as_ref())?;
        file.write_all(&encrypted)?;
        file.sync_all()?;

        Ok(encrypted.len())
    }

    /// Decrypt a file on disk
    pub fn decrypt_file<P: AsRef<Path>>(&self, input_path: P) -> GalleryResult<Vec<u8>> {
        let data = fs::read(input_path.as_ref())?;
        self.decode(&data)
    }
}

// ---------------------------------------------------------------------------
// One-shot helpers
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under `password` (SHA-256 derivation, random IV)
pub fn encode(plaintext: &[u8], password: &str) -> GalleryResult<Vec<u8>> {
    AssetCipher::from_password(password).encode(plaintext)
}

/// Decrypt an asset produced by [`encode`]
pub fn decode(buffer: &[u8], password: &str) -> GalleryResult<Vec<u8>> {
    AssetCipher::from_password(password).decode(buffer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_encode_decode_roundtrip_lengths() {
        let cipher = AssetCipher::from_password("tree2024");
        for len in [0usize, 1, 15, 16, 17, 31, 32, 33, 1000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let encrypted = cipher.encode(&plaintext).unwrap();

            assert_eq!(encrypted.len(), EncryptedAsset::encoded_len(len));
            assert_eq!(cipher.decode(&encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_iv_is_prefix() {
        let cipher = AssetCipher::from_password("tree2024");
        let iv = [0x5Au8; IV_LEN];
        let encrypted = cipher.encode_with_iv(b"photo", &iv).unwrap();

        assert_eq!(&encrypted[..IV_LEN], &iv);
        let asset = EncryptedAsset::parse(&encrypted).unwrap();
        assert_eq!(asset.iv(), &iv);
        assert_eq!(asset.ciphertext().len(), 16);
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        let cipher = AssetCipher::from_password("tree2024");
        let iv = [0x11u8; IV_LEN];
        let a = cipher.encode_with_iv(b"same bytes", &iv).unwrap();
        let b = cipher.encode_with_iv(b"same bytes", &iv).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresh_iv_per_encode() {
        let cipher = AssetCipher::from_password("tree2024");
        let a = cipher.encode(b"same bytes").unwrap();
        let b = cipher.encode(b"same bytes").unwrap();

        assert_ne!(a, b);
        assert_eq!(cipher.decode(&a).unwrap(), b"same bytes");
        assert_eq!(cipher.decode(&b).unwrap(), b"same bytes");
    }

    #[test]
    fn test_short_buffers_are_framing_errors() {
        let cipher = AssetCipher::from_password("tree2024");
        for len in 0..MIN_ASSET_LEN {
            let err = cipher.decode(&vec![0u8; len]).unwrap_err();
            assert!(err.is_framing(), "len {} gave {:?}", len, err);
        }
    }

    #[test]
    fn test_iv_only_buffer_is_decryption_error() {
        let err = decode(&[0u8; IV_LEN], "tree2024").unwrap_err();
        assert!(err.is_decryption());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        // Without a MAC about 1 in 256 wrong keys still unpads; count
        // rejections over many fresh IVs instead of trusting one sample.
        let plaintext = b"not really a jpeg";
        let mut rejected = 0;
        for _ in 0..64 {
            let encrypted = encode(plaintext, "tree2024").unwrap();
            match decode(&encrypted, "wrong") {
                Err(e) => {
                    assert!(e.is_decryption());
                    rejected += 1;
                }
                Ok(garbage) => assert_ne!(garbage, plaintext),
            }
        }
        assert!(rejected >= 56, "only {} of 64 rejected", rejected);
    }

    #[test]
    fn test_flipped_ciphertext_fails_or_differs() {
        let mut encrypted = encode(b"Secret photo bytes", "tree2024").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;

        match decode(&encrypted, "tree2024") {
            Err(e) => assert!(e.is_decryption()),
            Ok(plain) => assert_ne!(plain, b"Secret photo bytes"),
        }
    }

    #[test]
    fn test_cipher_reuse_matches_one_shot() {
        let cipher = AssetCipher::from_password("tree2024");
        let encrypted = cipher.encode(b"abc").unwrap();
        assert_eq!(decode(&encrypted, "tree2024").unwrap(), b"abc");
        assert_eq!(
            cipher.fingerprint(),
            veil_keys::password_hash_hex("tree2024")
        );
    }

    #[test]
    fn test_with_kdf_sha256_matches_from_password() {
        let password = SecretString::from("tree2024");
        let a = AssetCipher::with_kdf(&password, &KdfConfig::Sha256).unwrap();
        let b = AssetCipher::from_password("tree2024");
        assert_eq!(a.key().expose(), b.key().expose());
    }

    #[test]
    fn test_argon2_fingerprint_is_not_the_key() {
        let password = SecretString::from("tree2024");
        let kdf = KdfConfig::Argon2id(
            veil_keys::Argon2Config {
                time_cost: 1,
                memory_cost_kib: 1024,
                parallelism: 1,
                salt: String::new(),
            }
            .with_salt(&[9u8; 16]),
        );
        let cipher = AssetCipher::with_kdf(&password, &kdf).unwrap();

        assert_ne!(cipher.fingerprint(), hex::encode(cipher.key().expose()));
        assert_ne!(cipher.fingerprint(), veil_keys::password_hash_hex("tree2024"));
        assert!(cipher.key().matches_fingerprint(&cipher.fingerprint()));
    }

    #[test]
    fn test_encrypt_decrypt_file() {
        let cipher = AssetCipher::from_password("tree2024");
        let dir = tempdir().unwrap();

        let input_path = dir.path().join("1.jpg");
        let output_path = dir.path().join("1.jpg.enc");

        let original = b"FAKE JPEG DATA 1234567890";
        fs::write(&input_path, original).unwrap();

        let written = cipher.encrypt_file(&input_path, &output_path).unwrap();
        assert_eq!(written, EncryptedAsset::encoded_len(original.len()));
        assert_eq!(cipher.decrypt_file(&output_path).unwrap(), original);
    }
}
