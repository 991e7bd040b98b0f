//! Error types for the secret codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encrypting or decrypting secrets.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Empty plaintext, key, or envelope, or a null object payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Any failure after argument validation while encrypting.
    #[error("error encrypting data - {0}")]
    Encryption(String),

    /// Any failure while decoding or decrypting an envelope.
    #[error("error decrypting data - {0}")]
    Decryption(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CryptoError {
    /// Whether this error came out of the decrypt path.
    ///
    /// Callers opening stored records use this to tell a wrong or corrupt key
    /// apart from a bad argument.
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }
}
