//! Project records and secret protection for FOTT.
//!
//! A project file stores its storage-connection credentials and API key
//! encrypted under a named security token held in application settings.
//!
//! # Flow
//!
//! - **Save**: [`ProjectService::save`] stamps the record, runs
//!   [`guard::protect`], and writes `<name>.fott` through a
//!   [`StorageProvider`].
//! - **Open**: [`ProjectService::open`] reads the file, resolves the token
//!   (importing a shared one if given), and runs [`guard::reveal`]. A record
//!   that cannot be revealed is rejected whole.
//! - **Tokens**: [`AppSettings::ensure_security_token`] creates a token the
//!   first time a project needs one; [`LocalStore`] persists the settings.
//!
//! Sensitive fields are tagged variants ([`ProviderOptions`],
//! [`SecureString`]), so "already protected" is a pattern match rather than
//! a guess about field names.

mod error;
pub mod guard;
mod model;
mod provider;
mod service;
mod settings;
mod share;
mod store;

pub use error::{ProjectError, ProjectResult};
pub use guard::{protect, reveal};
pub use model::{Connection, Project, ProviderOptions, SecureString, ENCRYPTED_FIELD};
pub use provider::{LocalFileSystem, StorageProvider};
pub use service::{
    project_file_name, resolve_token, ProjectService, PROJECT_FILE_EXTENSION, PROJECT_VERSION,
};
pub use settings::{AppSettings, SecurityToken, Size};
pub use share::ShareInvite;
pub use store::{LocalStore, APP_SETTINGS_KEY};
