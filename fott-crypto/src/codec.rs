//! Text and JSON encryption under a base64 security-token key.

use crate::cipher::{decrypt_cbc, encrypt_cbc, random_iv};
use crate::envelope::Envelope;
use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Encrypts `plaintext` with the base64 `key`.
///
/// Every call draws a new IV, so equal inputs give different envelopes.
pub fn encrypt(plaintext: &str, key: &str) -> CryptoResult<Envelope> {
    require_non_empty(plaintext, "plaintext")?;
    require_non_empty(key, "key")?;

    let key = SecretKey::from_base64(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let iv = random_iv();
    let ciphertext = encrypt_cbc(&key, &iv, plaintext.as_bytes());

    Envelope::seal(&ciphertext, &iv)
}

/// Decrypts an envelope produced by [`encrypt`].
///
/// Success does not prove the key was right: CBC carries no MAC.
pub fn decrypt(envelope: impl AsRef<str>, key: &str) -> CryptoResult<String> {
    let envelope = envelope.as_ref();
    require_non_empty(envelope, "envelope")?;
    require_non_empty(key, "key")?;

    let key = SecretKey::from_base64(key).map_err(|e| CryptoError::Decryption(e.to_string()))?;
    let parts = Envelope::from(envelope).open()?;
    let plaintext = decrypt_cbc(&key, &parts.iv, &parts.ciphertext).map_err(CryptoError::Decryption)?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("plaintext is not valid UTF-8: {e}")))
}

/// Serializes `value` to JSON and encrypts it.
pub fn encrypt_object<T: Serialize + ?Sized>(value: &T, key: &str) -> CryptoResult<Envelope> {
    let json = serde_json::to_string(value).map_err(|e| CryptoError::Serialization(e.to_string()))?;
    if json == "null" {
        return Err(CryptoError::InvalidArgument("value must not be null".to_string()));
    }

    encrypt(&json, key)
}

/// Decrypts an envelope and parses the plaintext as JSON.
///
/// A parse failure is reported as [`CryptoError::Decryption`]; with CBC this is
/// the usual symptom of a wrong key that slipped past the padding check.
pub fn decrypt_object<T: DeserializeOwned>(envelope: impl AsRef<str>, key: &str) -> CryptoResult<T> {
    let json = decrypt(envelope, key)?;
    serde_json::from_str(&json)
        .map_err(|e| CryptoError::Decryption(format!("decrypted payload is not valid JSON: {e}")))
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `message`.
pub fn hash(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

fn require_non_empty(value: &str, what: &str) -> CryptoResult<()> {
    if value.is_empty() {
        return Err(CryptoError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(())
}
