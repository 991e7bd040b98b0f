//! The persisted envelope format.
//!
//! An envelope is a single opaque string:
//!
//! ```text
//! base64( utf8( {"ciphertext":"<hex>","iv":"<hex>"} ) )
//! ```
//!
//! Project files written by earlier releases carry this exact shape, so the
//! field order, hex casing, and base64 alphabet must not change.

use crate::cipher::IV_SIZE;
use crate::encoding::{decode_base64, encode_base64};
use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base64-wrapped ciphertext and IV produced by [`crate::encrypt`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(String);

/// JSON body inside the base64 wrapper.
#[derive(Serialize, Deserialize)]
struct EnvelopeBody {
    ciphertext: String,
    iv: String,
}

/// Decoded contents of an [`Envelope`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeParts {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_SIZE],
}

impl Envelope {
    /// Wraps ciphertext and IV into the persisted string form.
    pub(crate) fn seal(ciphertext: &[u8], iv: &[u8; IV_SIZE]) -> CryptoResult<Self> {
        let body = EnvelopeBody {
            ciphertext: hex::encode(ciphertext),
            iv: hex::encode(iv),
        };
        let json = serde_json::to_string(&body)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        Ok(Self(encode_base64(json.as_bytes())))
    }

    /// Decodes the wrapper and both hex fields.
    ///
    /// IVs longer than 16 bytes are truncated; shorter ones are rejected.
    pub fn open(&self) -> CryptoResult<EnvelopeParts> {
        let raw = decode_base64(&self.0)
            .map_err(|e| CryptoError::Decryption(format!("envelope is not valid base64: {e}")))?;
        let json = String::from_utf8(raw)
            .map_err(|e| CryptoError::Decryption(format!("envelope is not valid UTF-8: {e}")))?;
        let body: EnvelopeBody = serde_json::from_str(&json)
            .map_err(|e| CryptoError::Decryption(format!("envelope is not valid JSON: {e}")))?;

        let ciphertext = hex::decode(&body.ciphertext)
            .map_err(|e| CryptoError::Decryption(format!("ciphertext is not valid hex: {e}")))?;
        let iv_bytes = hex::decode(&body.iv)
            .map_err(|e| CryptoError::Decryption(format!("iv is not valid hex: {e}")))?;

        if iv_bytes.len() < IV_SIZE {
            return Err(CryptoError::Decryption(format!(
                "iv must be at least {IV_SIZE} bytes, got {}",
                iv_bytes.len()
            )));
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&iv_bytes[..IV_SIZE]);

        Ok(EnvelopeParts { ciphertext, iv })
    }

    /// Whether `text` decodes as an envelope. Needs no key.
    pub fn is_well_formed(text: &str) -> bool {
        !text.is_empty() && Self(text.to_string()).open().is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Envelope {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Envelope {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Envelope {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
