use initium_domain::config::ApiConfig;
use initium_kernel::config::{ConfigError, load_config};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn toml_file_overrides_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("initium.toml");
    fs::write(
        &path,
        r#"
        [initializr]
        url = "http://initializr.internal:8080"
        org_prefix = "com.acme"

        [catalog]
        ttl_seconds = 120
        serve_stale = false
        "#,
    )?;

    let cfg: ApiConfig = load_config(Some(&path))?;
    assert_eq!(cfg.initializr.url, "http://initializr.internal:8080");
    assert_eq!(cfg.initializr.org_prefix, "com.acme");
    assert_eq!(cfg.initializr.archive_path, "starter.zip");
    assert_eq!(cfg.catalog.ttl_seconds, 120);
    assert!(!cfg.catalog.serve_stale);
    assert_eq!(cfg.server.port, 4583);
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() {
    let result = load_config::<ApiConfig>(Some(Path::new("/definitely/not/here/initium.toml")));
    assert!(matches!(result, Err(ConfigError::Config { context: Some(_), .. })));
}

#[test]
fn without_path_defaults_apply() -> Result<(), ConfigError> {
    let cfg: ApiConfig = load_config(None::<&Path>)?;
    assert_eq!(cfg.initializr.timeout_seconds, 30);
    assert_eq!(cfg.metric.dds_prefix, "");
    Ok(())
}

#[test]
fn malformed_values_fail_deserialization() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "catalog": { "ttl_seconds": "soon" } }"#)?;

    let err = load_config::<ApiConfig>(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize config"));
    Ok(())
}
