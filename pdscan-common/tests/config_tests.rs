//! Unit tests for configuration loading and root folder resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PDSCAN_ROOT_FOLDER are marked with #[serial].

use pdscan_common::config::{
    default_root_folder, load_toml_config, resolve_root_folder, RootFolderInitializer,
    TomlConfig, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER, ROOT_FOLDER_ENV,
};
use pdscan_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("pdscan.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_missing_config_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_toml_config(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_empty_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let config = load_toml_config(&path).unwrap();

    assert!(config.root_folder.is_none());
    assert!(config.port.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(config.models.spiral.is_none());
    assert!(config.smtp.is_none());
}

#[test]
fn test_full_config_parses() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
root_folder = "/srv/pdscan"
port = 8080

[logging]
level = "debug"

[models]
spiral = "/models/spiral.onnx"
wave = "wave.onnx"

[smtp]
username = "reports@example.com"
password = "app-password"
"#,
    );
    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/pdscan")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.models.spiral, Some(PathBuf::from("/models/spiral.onnx")));
    assert!(config.models.mri.is_none());

    let smtp = config.smtp.unwrap();
    assert_eq!(smtp.server, DEFAULT_SMTP_SERVER);
    assert_eq!(smtp.port, DEFAULT_SMTP_PORT);
    assert_eq!(smtp.username.as_deref(), Some("reports@example.com"));
    assert!(smtp.sender.is_none());
}

#[test]
fn test_malformed_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = \"not a number\"");
    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), ROOT_FOLDER_ENV, &toml);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &toml);
    assert_eq!(resolved, PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };
    assert_eq!(
        resolve_root_folder(None, ROOT_FOLDER_ENV, &toml),
        PathBuf::from("/from/toml")
    );

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert_eq!(resolved, default_root_folder());
    assert!(!resolved.as_os_str().is_empty());
}

#[test]
fn test_initializer_creates_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("root");
    let initializer = RootFolderInitializer::new(root.clone());

    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(initializer.reports_dir().is_dir());
    assert!(initializer.models_dir().is_dir());
    assert_eq!(initializer.feedback_path(), root.join("feedback.txt"));
    assert_eq!(initializer.models_dir(), root.join("models"));

    // Idempotent on an existing layout
    initializer.ensure_directory_exists().unwrap();
}
