//! Share strings for handing a project to another user.
//!
//! A share string is `base64(JSON{sasFolder, projectName, token})`. It carries
//! the security token in the clear, so it must travel over a trusted channel.

use crate::error::{ProjectError, ProjectResult};
use crate::model::Project;
use crate::settings::{AppSettings, SecurityToken};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Everything a recipient needs to open a shared project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInvite {
    pub sas_folder: String,
    pub project_name: String,
    pub token: SecurityToken,
}

impl ShareInvite {
    /// Builds an invite from a revealed project.
    pub fn for_project(project: &Project, settings: &AppSettings) -> ProjectResult<Self> {
        let options = project
            .source_connection
            .provider_options
            .as_ref()
            .ok_or_else(|| ProjectError::MissingProviderOption("sas".to_string()))?;
        if options.is_protected() {
            return Err(ProjectError::MissingProviderOption(
                "sas (provider options are still encrypted)".to_string(),
            ));
        }
        let sas = options
            .get_str("sas")
            .ok_or_else(|| ProjectError::MissingProviderOption("sas".to_string()))?;

        let token = settings.require_token(&project.security_token)?.clone();

        Ok(Self {
            sas_folder: sas.to_string(),
            project_name: project.name.clone(),
            token,
        })
    }

    pub fn encode(&self) -> ProjectResult<String> {
        let json = serde_json::to_string(self)?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(text: &str) -> ProjectResult<Self> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| ProjectError::InvalidShareString(e.to_string()))?;
        let invite: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ProjectError::InvalidShareString(e.to_string()))?;

        if invite.token.name.is_empty() || invite.token.key.is_empty() {
            return Err(ProjectError::InvalidShareString(
                "share string has no security token".to_string(),
            ));
        }
        Ok(invite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            ShareInvite::decode("%%%"),
            Err(ProjectError::InvalidShareString(_))
        ));
        // base64("{}")
        assert!(matches!(
            ShareInvite::decode("e30="),
            Err(ProjectError::InvalidShareString(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_token() {
        let invite = ShareInvite {
            sas_folder: "https://acct.blob/c?sig=x".to_string(),
            project_name: "p".to_string(),
            token: SecurityToken::new("p Token", ""),
        };
        let text = invite.encode().unwrap();
        assert!(ShareInvite::decode(&text).is_err());
    }

    #[test]
    fn wire_field_names() {
        let invite = ShareInvite {
            sas_folder: "sas".to_string(),
            project_name: "p".to_string(),
            token: SecurityToken::new("n", "k"),
        };
        let json = serde_json::to_value(&invite).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sasFolder": "sas",
                "projectName": "p",
                "token": { "name": "n", "key": "k" }
            })
        );
    }
}
