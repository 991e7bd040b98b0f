//! Project layer error types.

use fott_crypto::CryptoError;
use thiserror::Error;

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Errors that can occur while protecting, storing, or opening projects.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("security token not found: {0}")]
    SecurityTokenNotFound(String),

    /// The token exists but cannot open the project settings.
    #[error("error decrypting settings for project '{0}'")]
    InvalidSecurityToken(String),

    #[error("security token '{0}' already exists with a different key")]
    TokenNameConflict(String),

    #[error("project '{name}' already exists with the same target connection '{connection}'")]
    DuplicateProject { name: String, connection: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid share string: {0}")]
    InvalidShareString(String),

    #[error("missing provider option: {0}")]
    MissingProviderOption(String),
}
