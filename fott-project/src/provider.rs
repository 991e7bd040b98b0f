//! Storage providers for project files.

use crate::error::{ProjectError, ProjectResult};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Text file access for a project's storage connection.
///
/// Paths are relative to the connection root and use `/` separators.
pub trait StorageProvider: Send + Sync {
    fn read_text(&self, path: &str) -> ProjectResult<String>;

    fn write_text(&self, path: &str, contents: &str) -> ProjectResult<()>;

    fn delete_file(&self, path: &str) -> ProjectResult<()>;

    fn file_exists(&self, path: &str) -> bool;
}

/// A folder on the local file system.
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `path` under the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> ProjectResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.trim().is_empty() || escapes {
            return Err(ProjectError::Storage(format!("invalid path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

impl StorageProvider for LocalFileSystem {
    fn read_text(&self, path: &str) -> ProjectResult<String> {
        let full = self.resolve(path)?;
        match std::fs::read_to_string(&full) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProjectError::NotFound(path.to_string()))
            }
            Err(e) => Err(ProjectError::Storage(e.to_string())),
        }
    }

    fn write_text(&self, path: &str, contents: &str) -> ProjectResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::Storage(e.to_string()))?;
        }
        std::fs::write(&full, contents).map_err(|e| ProjectError::Storage(e.to_string()))?;
        debug!("wrote {} bytes to {}", contents.len(), full.display());
        Ok(())
    }

    fn delete_file(&self, path: &str) -> ProjectResult<()> {
        let full = self.resolve(path)?;
        match std::fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProjectError::NotFound(path.to_string()))
            }
            Err(e) => Err(ProjectError::Storage(e.to_string())),
        }
    }

    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}
