//! Application settings and named security tokens.

use crate::error::{ProjectError, ProjectResult};
use crate::model::Project;
use fott_crypto::generate_key;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A named symmetric key used to protect project secrets.
///
/// `key` is the base64 form of 32 random bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityToken {
    pub name: String,
    pub key: String,
}

impl SecurityToken {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Creates a token with a freshly generated key.
    pub fn generate(name: impl Into<String>) -> Self {
        Self::new(name, generate_key())
    }
}

impl std::fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityToken")
            .field("name", &self.name)
            .field("key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Root level application settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub security_tokens: Vec<SecurityToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_size: Option<Size>,
}

impl AppSettings {
    pub fn find_token(&self, name: &str) -> Option<&SecurityToken> {
        self.security_tokens.iter().find(|t| t.name == name)
    }

    /// Like [`find_token`](Self::find_token), but a missing token is an error.
    pub fn require_token(&self, name: &str) -> ProjectResult<&SecurityToken> {
        self.find_token(name)
            .ok_or_else(|| ProjectError::SecurityTokenNotFound(name.to_string()))
    }

    /// Returns the token the project refers to, creating one if needed.
    ///
    /// New tokens are named `"<project> Token"`, with a ` [n]` suffix when
    /// other tokens already share that prefix. The project's
    /// `security_token` is updated to the new name.
    pub fn ensure_security_token(&mut self, project: &mut Project) -> &SecurityToken {
        if let Some(index) = self
            .security_tokens
            .iter()
            .position(|t| t.name == project.security_token)
        {
            return &self.security_tokens[index];
        }

        let prefix = format!("{} Token", project.name);
        let mut count = self
            .security_tokens
            .iter()
            .filter(|t| t.name.starts_with(&prefix))
            .count();

        let mut name = token_name(&prefix, count);
        while self.find_token(&name).is_some() {
            count += 1;
            name = token_name(&prefix, count);
        }

        info!("created security token '{name}' for project '{}'", project.name);
        project.security_token = name.clone();
        self.security_tokens.push(SecurityToken::generate(name));

        let last = self.security_tokens.len() - 1;
        &self.security_tokens[last]
    }

    /// Adds a token received with a shared project.
    ///
    /// Importing a token that is already known is a no-op. A known name with
    /// a different key is refused rather than overwritten.
    pub fn import_shared_token(&mut self, token: SecurityToken) -> ProjectResult<()> {
        match self.find_token(&token.name) {
            Some(existing) if existing.key == token.key => Ok(()),
            Some(_) => Err(ProjectError::TokenNameConflict(token.name)),
            None => {
                info!("imported shared security token '{}'", token.name);
                self.security_tokens.push(token);
                Ok(())
            }
        }
    }
}

fn token_name(prefix: &str, count: usize) -> String {
    if count == 0 {
        prefix.to_string()
    } else {
        format!("{prefix} [{count}]")
    }
}
