//! Project secret guard.
//!
//! Moves the sensitive parts of a project (the source connection's provider
//! options and the API key) between plaintext and protected form.
//!
//! Both directions are copy-on-write and idempotent: protecting a protected
//! field, or revealing a plaintext one, leaves it untouched. Each field is
//! either fully replaced or left alone, and the whole call fails if any field
//! fails, so callers never see a half-protected record.
//!
//! The caller looks up the [`SecurityToken`] first; a missing token is
//! reported by [`AppSettings::require_token`](crate::AppSettings::require_token).

use crate::error::ProjectResult;
use crate::model::{marker_envelope, Project, ProviderOptions, SecureString};
use crate::settings::SecurityToken;
use fott_crypto::{
    decrypt, decrypt_object, encrypt, encrypt_object, CryptoError, CryptoResult,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Returns a copy of `project` with its secrets protected under `token`.
pub fn protect(project: &Project, token: &SecurityToken) -> ProjectResult<Project> {
    let mut protected = project.clone();

    protected.source_connection.provider_options = project
        .source_connection
        .provider_options
        .as_ref()
        .map(|options| protect_options(options, &token.key))
        .transpose()?;
    protected.api_key = protect_secure_string(project.api_key.as_ref(), &token.key)?;

    debug!(
        "protected settings for project '{}' with token '{}'",
        project.name, token.name
    );
    Ok(protected)
}

/// Returns a copy of `project` with its secrets revealed using `token`.
pub fn reveal(project: &Project, token: &SecurityToken) -> ProjectResult<Project> {
    let mut revealed = project.clone();

    revealed.source_connection.provider_options = project
        .source_connection
        .provider_options
        .as_ref()
        .map(|options| reveal_options(options, &token.key))
        .transpose()?;
    revealed.api_key = reveal_secure_string(project.api_key.as_ref(), &token.key)?;

    debug!(
        "revealed settings for project '{}' with token '{}'",
        project.name, token.name
    );
    Ok(revealed)
}

/// A plaintext map shaped like the `{"encrypted": "..."}` marker is refused,
/// since it could not be told apart from protected options once revealed.
pub fn protect_options(options: &ProviderOptions, key: &str) -> CryptoResult<ProviderOptions> {
    match options {
        ProviderOptions::Protected(_) => Ok(options.clone()),
        ProviderOptions::Plaintext(map) if marker_envelope(map).is_some() => {
            Err(CryptoError::InvalidArgument(
                "provider options cannot consist of a single 'encrypted' string".to_string(),
            ))
        }
        ProviderOptions::Plaintext(map) => Ok(ProviderOptions::Protected(encrypt_object(map, key)?)),
    }
}

/// The decrypted payload must be a JSON object; anything else is reported
/// as a decryption failure.
pub fn reveal_options(options: &ProviderOptions, key: &str) -> CryptoResult<ProviderOptions> {
    match options {
        ProviderOptions::Plaintext(_) => Ok(options.clone()),
        ProviderOptions::Protected(envelope) => {
            let map: Map<String, Value> = decrypt_object(envelope, key)?;
            Ok(ProviderOptions::Plaintext(map))
        }
    }
}

/// An empty plain string is dropped rather than encrypted.
pub fn protect_secure_string(
    value: Option<&SecureString>,
    key: &str,
) -> CryptoResult<Option<SecureString>> {
    match value {
        None => Ok(None),
        Some(SecureString::Plain(text)) if text.is_empty() => Ok(None),
        Some(SecureString::Plain(text)) => Ok(Some(SecureString::Protected(encrypt(text, key)?))),
        Some(protected @ SecureString::Protected(_)) => Ok(Some(protected.clone())),
    }
}

pub fn reveal_secure_string(
    value: Option<&SecureString>,
    key: &str,
) -> CryptoResult<Option<SecureString>> {
    match value {
        Some(SecureString::Protected(envelope)) => Ok(Some(SecureString::Plain(decrypt(envelope, key)?))),
        other => Ok(other.cloned()),
    }
}
