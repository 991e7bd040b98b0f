//! Local key/value persistence for application state.
//!
//! One `LocalStore` is built at startup and handed to whatever needs it;
//! there is no process-wide instance.

use crate::error::{ProjectError, ProjectResult};
use crate::settings::AppSettings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage key for [`AppSettings`].
pub const APP_SETTINGS_KEY: &str = "appSettings";

/// JSON documents stored as one file per key under a root directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the platform data directory for the store.
    #[must_use]
    pub fn default_path() -> PathBuf {
        #[cfg(any(target_os = "macos", target_os = "windows"))]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("FOTT")
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fott")
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> ProjectResult<Option<T>> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::Storage(e.to_string()))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn set_item<T: Serialize>(&self, key: &str, value: &T) -> ProjectResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| ProjectError::Storage(e.to_string()))?;

        let path = self.item_path(key);
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json).map_err(|e| ProjectError::Storage(e.to_string()))?;
        restrict_permissions(&path);

        debug!("stored item '{key}'");
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> ProjectResult<()> {
        let path = self.item_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| ProjectError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    /// Loads settings, falling back to defaults on first run.
    pub fn load_app_settings(&self) -> ProjectResult<AppSettings> {
        Ok(self.get_item(APP_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_app_settings(&self, settings: &AppSettings) -> ProjectResult<()> {
        self.set_item(APP_SETTINGS_KEY, settings)
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Maps a storage key onto a safe file stem.
fn sanitize_key(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

// Security tokens live in these files.
#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!("could not restrict permissions on {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SecurityToken;
    use tempfile::tempdir;

    #[test]
    fn missing_item_is_none() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(store.get_item::<String>("nothing").unwrap(), None);
        assert_eq!(store.load_app_settings().unwrap(), AppSettings::default());
    }

    #[test]
    fn settings_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("profile"));

        let mut settings = AppSettings::default();
        settings.security_tokens.push(SecurityToken::generate("a Token"));
        store.save_app_settings(&settings).unwrap();

        assert_eq!(store.load_app_settings().unwrap(), settings);
    }

    #[test]
    fn remove_item_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.set_item("recent/projects", &vec!["a", "b"]).unwrap();
        assert_eq!(
            store.get_item::<Vec<String>>("recent/projects").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        store.remove_item("recent/projects").unwrap();
        store.remove_item("recent/projects").unwrap();
        assert_eq!(store.get_item::<Vec<String>>("recent/projects").unwrap(), None);
    }

    #[test]
    fn keys_cannot_escape_root() {
        assert_eq!(sanitize_key("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_key(""), "_");
    }

    #[cfg(unix)]
    #[test]
    fn settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.save_app_settings(&AppSettings::default()).unwrap();

        let mode = std::fs::metadata(dir.path().join("appSettings.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
