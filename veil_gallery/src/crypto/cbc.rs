//! Veil Gallery - AES-256-CBC
//!
//! There is no authentication tag. A wrong key is only noticed when PKCS#7
//! unpadding fails, and roughly one wrong key in 256 unpads cleanly and
//! yields garbage. The distinct padding error is also a narrow padding
//! oracle if a server ever decrypts on behalf of untrusted callers.

use ::cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;

use super::keys::{BLOCK_LEN, IV_LEN, KEY_LEN};
use crate::error::{GalleryError, GalleryResult};

type Aes256CbcEnc = ::cbc::Encryptor<Aes256>;
type Aes256CbcDec = ::cbc::Decryptor<Aes256>;

/// Encrypt with AES-256-CBC, PKCS#7 padded
pub fn encrypt_cbc(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> GalleryResult<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| GalleryError::EncryptionFailed(e.to_string()))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt AES-256-CBC and strip PKCS#7 padding
pub fn decrypt_cbc(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> GalleryResult<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(GalleryError::DecryptionFailed(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            BLOCK_LEN
        )));
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| GalleryError::DecryptionFailed(e.to_string()))?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            GalleryError::DecryptionFailed("invalid padding - wrong password or corrupted data".into())
        })
}
