//! Project load/save on top of a storage provider.
//!
//! Projects are protected immediately before they are written and revealed
//! immediately after they are read. A project that cannot be revealed is
//! rejected whole.

use crate::error::{ProjectError, ProjectResult};
use crate::guard::{protect, reveal};
use crate::model::Project;
use crate::provider::StorageProvider;
use crate::settings::{AppSettings, SecurityToken};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extension of persisted project files.
pub const PROJECT_FILE_EXTENSION: &str = ".fott";

/// Version stamped into saved projects.
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the storage path of a project file.
pub fn project_file_name(name: &str) -> String {
    format!("{name}{PROJECT_FILE_EXTENSION}")
}

/// Loads, saves, and deletes projects in one storage connection.
pub struct ProjectService {
    provider: Arc<dyn StorageProvider>,
}

impl ProjectService {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Reveals a project record read from storage.
    ///
    /// Any failure to reveal is reported as
    /// [`ProjectError::InvalidSecurityToken`].
    pub fn load(&self, project: &Project, token: &SecurityToken) -> ProjectResult<Project> {
        reveal(project, token).map_err(|e| {
            warn!("could not decrypt project '{}': {e}", project.name);
            ProjectError::InvalidSecurityToken(project.name.clone())
        })
    }

    /// Stamps, protects, and writes the project. Returns the protected record.
    ///
    /// The input is not modified; an empty `id` is replaced with a new UUID in
    /// the returned copy.
    pub fn save(&self, project: &Project, token: &SecurityToken) -> ProjectResult<Project> {
        let mut stamped = project.clone();
        stamped.version = PROJECT_VERSION.to_string();
        if stamped.id.is_empty() {
            stamped.id = uuid::Uuid::new_v4().to_string();
        }

        let protected = protect(&stamped, token)?;
        let contents = to_project_json(&protected)?;
        self.provider
            .write_text(&project_file_name(&protected.name), &contents)?;

        info!("saved project '{}' ({})", protected.name, protected.id);
        Ok(protected)
    }

    /// Reads `<name>.fott` and reveals it.
    ///
    /// A `shared_token` (from a share string) is imported into `settings`
    /// first; otherwise the token named by the project file is used.
    pub fn open(
        &self,
        name: &str,
        settings: &mut AppSettings,
        shared_token: Option<SecurityToken>,
    ) -> ProjectResult<Project> {
        let text = self.provider.read_text(&project_file_name(name))?;
        let raw: Project = serde_json::from_str(&text)?;
        let token = resolve_token(settings, &raw, shared_token)?;

        debug!("opening project '{}' with token '{}'", raw.name, token.name);
        self.load(&raw, &token)
    }

    pub fn delete(&self, project: &Project) -> ProjectResult<()> {
        self.provider.delete_file(&project_file_name(&project.name))?;
        info!("deleted project '{}'", project.name);
        Ok(())
    }

    /// Whether a project file with this name already exists.
    pub fn exists(&self, name: &str) -> bool {
        self.provider.file_exists(&project_file_name(name))
    }

    /// Whether another project with the same name points at the same
    /// connection options.
    pub fn is_duplicate(project: &Project, known: &[Project]) -> bool {
        let options = serde_json::to_value(&project.source_connection.provider_options).ok();
        known.iter().any(|other| {
            other.id != project.id
                && other.name == project.name
                && serde_json::to_value(&other.source_connection.provider_options).ok() == options
        })
    }

    /// [`is_duplicate`](Self::is_duplicate) as an error.
    pub fn ensure_unique(project: &Project, known: &[Project]) -> ProjectResult<()> {
        if Self::is_duplicate(project, known) {
            return Err(ProjectError::DuplicateProject {
                name: project.name.clone(),
                connection: project.source_connection.name.clone(),
            });
        }
        Ok(())
    }
}

/// Picks the token for opening `project`.
///
/// A shared token wins and is imported into `settings`; a name clash with a
/// different key is refused. Without one, the project's own token name must
/// be known.
pub fn resolve_token(
    settings: &mut AppSettings,
    project: &Project,
    shared_token: Option<SecurityToken>,
) -> ProjectResult<SecurityToken> {
    match shared_token {
        Some(token) => {
            settings.import_shared_token(token.clone())?;
            Ok(token)
        }
        None => settings.require_token(&project.security_token).cloned(),
    }
}

/// Project files are indented with four spaces.
fn to_project_json(project: &Project) -> ProjectResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    project.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| ProjectError::Storage(e.to_string()))
}
