//! Veil Gallery - Key and IV Material

use rand::RngCore;

/// Key length for AES-256
pub const KEY_LEN: usize = veil_keys::KEY_LEN;

/// CBC initialization vector length
pub const IV_LEN: usize = 16;

/// AES block size
pub const BLOCK_LEN: usize = 16;

/// Generate a fresh random IV from the thread CSPRNG
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Ciphertext length after PKCS#7 padding.
///
/// Padding always adds between 1 and 16 bytes, so an empty plaintext
/// still produces one full block.
pub fn padded_len(plaintext_len: usize) -> usize {
    (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN
}
