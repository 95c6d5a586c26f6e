use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

/// This test ensures that a static config plus the required env var produces
/// a fully merged MirrorConfig.
#[test]
#[serial]
fn test_load_config_success_injects_env_token() {
    let config_yaml = r#"
source:
  base_url: "https://files.example.org/mirror/downloads/"
  product: Product
  arch: amd64
  extension: iso
fetch:
  max_attempts: 5
  retry_delay_secs: 2
  work_dir: ./tmp/mirror-work
release:
  repository: example/ce-mirror
  api_base: "https://api.example.org"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("RELEASE_TOKEN", "top-secret-test-token");

    let config =
        release_mirror::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(
        config.source.base_url,
        "https://files.example.org/mirror/downloads/"
    );
    assert_eq!(config.source.product, "Product");
    assert_eq!(config.source.arch, "amd64");
    assert_eq!(config.source.extension, "iso");

    assert_eq!(config.fetch.retry.max_attempts, 5);
    assert_eq!(config.fetch.retry.delay, Duration::from_secs(2));
    assert_eq!(
        config.fetch.work_dir,
        Some(PathBuf::from("./tmp/mirror-work"))
    );

    assert_eq!(config.release.repository, "example/ce-mirror");
    assert_eq!(config.release.api_base, "https://api.example.org");

    // Token must come directly from environment, never from the file.
    assert_eq!(config.release.token.as_deref(), Some("top-secret-test-token"));
}

/// Omitted fetch/api_base settings fall back to the documented defaults.
#[test]
#[serial]
fn test_load_config_applies_defaults() {
    let config_yaml = r#"
source:
  base_url: "https://files.example.org/mirror/downloads/"
  product: Product
  arch: amd64
  extension: iso
release:
  repository: example/ce-mirror
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("RELEASE_TOKEN", "top-secret-test-token");

    let config =
        release_mirror::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.fetch.retry.max_attempts, 3);
    assert_eq!(config.fetch.retry.delay, Duration::from_secs(10));
    assert_eq!(config.fetch.work_dir, None);
    assert_eq!(config.release.api_base, "https://api.github.com");
}

/// This test ensures that a missing required env var makes the loader fail.
#[test]
#[serial]
fn test_load_config_errors_on_missing_env() {
    let config_yaml = r#"
source:
  base_url: "https://files.example.org/mirror/downloads/"
  product: Product
  arch: amd64
  extension: iso
release:
  repository: example/ce-mirror
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var("RELEASE_TOKEN");

    let err = release_mirror::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("RELEASE_TOKEN"),
        "Must error for missing env var, got: {msg}"
    );
}

/// This test ensures that if the config file is not valid YAML, load_config
/// errors and reports as such.
#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"{{{{ not yaml").unwrap();

    env::set_var("RELEASE_TOKEN", "irrelevant");

    let err = release_mirror::load_config::load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = release_mirror::load_config::load_config("/definitely/not/a/real/config.yaml")
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
