//! AES-256-CBC with PKCS#7 padding.
//!
//! This matches the WebCrypto `AES-CBC` algorithm used to write existing
//! project files. There is no MAC: a wrong key usually fails the padding
//! check, but it can also produce garbage that happens to unpad cleanly.

use crate::key::SecretKey;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, Iv, Key, KeyIvInit};
use rand::RngCore;

/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generates a fresh random IV. Called once per encryption.
pub(crate) fn random_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);
    iv
}

pub(crate) fn encrypt_cbc(key: &SecretKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(
        Key::<Aes256CbcEnc>::from_slice(key.as_bytes()),
        Iv::<Aes256CbcEnc>::from_slice(iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypts and strips padding. The error string is the only detail callers get.
pub(crate) fn decrypt_cbc(
    key: &SecretKey,
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, String> {
    if ciphertext.is_empty() || ciphertext.len() % IV_SIZE != 0 {
        return Err(format!(
            "ciphertext length {} is not a positive multiple of the block size",
            ciphertext.len()
        ));
    }

    Aes256CbcDec::new(
        Key::<Aes256CbcDec>::from_slice(key.as_bytes()),
        Iv::<Aes256CbcDec>::from_slice(iv),
    )
    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
    .map_err(|_| "bad padding (wrong key or corrupted data)".to_string())
}
