use fott_project::{
    project_file_name, AppSettings, LocalFileSystem, LocalStore, Project, ProjectError,
    ProjectService, SecureString, SecurityToken, ShareInvite, StorageProvider,
    PROJECT_VERSION,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn new_project(name: &str) -> Project {
    serde_json::from_value(json!({
        "name": name,
        "sourceConnection": {
            "id": "c1",
            "name": "team blob",
            "providerType": "azureBlobStorage",
            "providerOptions": { "sas": "https://acct.blob.core.windows.net/forms?sv=1&sig=abc" }
        },
        "apiUriBase": "https://fr.example",
        "apiKey": "prediction-key",
        "folderPath": "",
        "assets": {}
    }))
    .unwrap()
}

fn service(root: &std::path::Path) -> (ProjectService, Arc<LocalFileSystem>) {
    let fs = Arc::new(LocalFileSystem::new(root));
    (ProjectService::new(fs.clone()), fs)
}

#[test]
fn save_then_open_roundtrip() {
    init_tracing();
    let dir = tempdir().unwrap();
    let (service, fs) = service(dir.path());

    let mut settings = AppSettings::default();
    let mut project = new_project("invoices");
    let token = settings.ensure_security_token(&mut project).clone();
    assert_eq!(project.security_token, "invoices Token");

    let saved = service.save(&project, &token).unwrap();
    assert!(!saved.id.is_empty());
    assert_eq!(saved.version, PROJECT_VERSION);
    assert!(saved.has_protected_fields());
    assert!(project.id.is_empty(), "input must not be modified");

    let text = fs.read_text("invoices.fott").unwrap();
    assert!(!text.contains("sig=abc"));
    assert!(!text.contains("prediction-key"));
    assert!(text.contains("\n    \"name\": \"invoices\""));

    let opened = service.open("invoices", &mut settings, None).unwrap();
    assert_eq!(opened.id, saved.id);
    assert_eq!(
        opened.source_connection.provider_options.as_ref().unwrap().get_str("sas"),
        Some("https://acct.blob.core.windows.net/forms?sv=1&sig=abc")
    );
    assert_eq!(opened.api_key, Some(SecureString::from("prediction-key")));
    assert_eq!(opened.extra.get("assets"), Some(&json!({})));
}

#[test]
fn saving_twice_keeps_id() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());
    let token = SecurityToken::generate("t");

    let mut project = new_project("p");
    project.security_token = "t".to_string();

    let first = service.save(&project, &token).unwrap();
    let second = service.save(&first, &token).unwrap();
    assert_eq!(first.id, second.id);
    // Already protected fields are written as-is.
    assert_eq!(first.source_connection, second.source_connection);
}

#[test]
fn open_with_unknown_token_fails() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());

    let mut settings = AppSettings::default();
    let mut project = new_project("lost");
    let token = settings.ensure_security_token(&mut project).clone();
    service.save(&project, &token).unwrap();

    let mut fresh = AppSettings::default();
    let err = service.open("lost", &mut fresh, None).unwrap_err();
    assert!(matches!(err, ProjectError::SecurityTokenNotFound(name) if name == "lost Token"));
}

#[test]
fn open_with_wrong_key_rejects_whole_project() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());

    let mut settings = AppSettings::default();
    let mut project = new_project("swapped");
    let token = settings.ensure_security_token(&mut project).clone();
    service.save(&project, &token).unwrap();

    // Same token name, different key.
    let mut other = AppSettings::default();
    other.security_tokens.push(SecurityToken::generate(token.name.clone()));

    match service.open("swapped", &mut other, None) {
        Err(ProjectError::InvalidSecurityToken(name)) => assert_eq!(name, "swapped"),
        Err(e) => panic!("unexpected error: {e}"),
        // Without a MAC a wrong key can slip through; the secrets must still differ.
        Ok(opened) => assert_ne!(opened.api_key, Some(SecureString::from("prediction-key"))),
    }
}

#[test]
fn load_maps_crypto_failure_to_invalid_token() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());
    let token = SecurityToken::generate("t");

    let mut project = new_project("broken");
    project.api_key = Some(SecureString::Protected("not-valid-base64!!".into()));

    let err = service.load(&project, &token).unwrap_err();
    assert!(matches!(err, ProjectError::InvalidSecurityToken(_)));
}

#[test]
fn open_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());
    let mut settings = AppSettings::default();
    assert!(matches!(
        service.open("nope", &mut settings, None),
        Err(ProjectError::NotFound(_))
    ));
}

#[test]
fn shared_project_opens_on_another_profile() {
    init_tracing();
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());

    // Owner saves and shares.
    let mut owner = AppSettings::default();
    let mut project = new_project("shared");
    let token = owner.ensure_security_token(&mut project).clone();
    service.save(&project, &token).unwrap();

    let invite = ShareInvite::for_project(&project, &owner).unwrap();
    let text = invite.encode().unwrap();

    // Recipient decodes and opens with the shared token.
    let received = ShareInvite::decode(&text).unwrap();
    assert_eq!(received, invite);
    assert_eq!(received.project_name, "shared");

    let mut recipient = AppSettings::default();
    let opened = service
        .open(&received.project_name, &mut recipient, Some(received.token.clone()))
        .unwrap();
    assert_eq!(opened.api_key, Some(SecureString::from("prediction-key")));
    assert_eq!(recipient.find_token("shared Token"), Some(&token));
}

#[test]
fn shared_token_name_clash_is_refused() {
    let dir = tempdir().unwrap();
    let (service, _) = service(dir.path());

    let mut owner = AppSettings::default();
    let mut project = new_project("clash");
    let token = owner.ensure_security_token(&mut project).clone();
    service.save(&project, &token).unwrap();

    let mut recipient = AppSettings::default();
    recipient
        .security_tokens
        .push(SecurityToken::generate(token.name.clone()));

    assert!(matches!(
        service.open("clash", &mut recipient, Some(token)),
        Err(ProjectError::TokenNameConflict(_))
    ));
}

#[test]
fn share_requires_revealed_options() {
    let mut settings = AppSettings::default();
    let mut project = new_project("locked");
    let token = settings.ensure_security_token(&mut project).clone();
    let protected = fott_project::protect(&project, &token).unwrap();

    assert!(matches!(
        ShareInvite::for_project(&protected, &settings),
        Err(ProjectError::MissingProviderOption(_))
    ));
}

#[test]
fn delete_removes_file() {
    let dir = tempdir().unwrap();
    let (service, fs) = service(dir.path());
    let token = SecurityToken::generate("t");

    let project = new_project("gone");
    let saved = service.save(&project, &token).unwrap();
    assert!(service.exists("gone"));
    assert!(fs.file_exists(&project_file_name("gone")));

    service.delete(&saved).unwrap();
    assert!(!service.exists("gone"));
}

#[test]
fn duplicates_need_same_name_and_connection() {
    let mut a = new_project("dup");
    a.id = "a".to_string();
    let mut b = new_project("dup");
    b.id = "b".to_string();
    let mut c = new_project("other");
    c.id = "c".to_string();

    assert!(ProjectService::is_duplicate(&b, &[a.clone(), c.clone()]));
    assert!(!ProjectService::is_duplicate(&a, &[a.clone()]));
    assert!(!ProjectService::is_duplicate(&c, &[a.clone(), b.clone()]));

    let err = ProjectService::ensure_unique(&b, &[a]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "project 'dup' already exists with the same target connection 'team blob'"
    );
}

#[test]
fn settings_survive_restart() {
    let dir = tempdir().unwrap();
    let store = LocalStore::new(dir.path());

    let mut settings = store.load_app_settings().unwrap();
    let mut project = new_project("persisted");
    let key = settings.ensure_security_token(&mut project).key.clone();
    store.save_app_settings(&settings).unwrap();

    let reloaded = LocalStore::new(dir.path()).load_app_settings().unwrap();
    assert_eq!(reloaded.require_token("persisted Token").unwrap().key, key);
}

#[test]
fn corrupt_stored_envelope_rejects_project() {
    let dir = tempdir().unwrap();
    let (service, fs) = service(dir.path());

    let mut settings = AppSettings::default();
    let mut project = new_project("corrupt");
    settings.ensure_security_token(&mut project);

    let mut raw = serde_json::to_value(&project).unwrap();
    raw["sourceConnection"]["providerOptions"] = json!({ "encrypted": "eyJjaXBoZXJ0ZXh0Ijoi" });
    raw["apiKey"] = serde_json::Value::Null;
    fs.write_text("corrupt.fott", &raw.to_string()).unwrap();

    match service.open("corrupt", &mut settings, None) {
        Err(ProjectError::InvalidSecurityToken(name)) => assert_eq!(name, "corrupt"),
        other => panic!("expected InvalidSecurityToken, got {other:?}"),
    }
}
