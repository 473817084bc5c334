//! Integration tests for parsing config fixtures from the workspace testkit.

use account_client_config::{
    CURRENT_CONFIG_VERSION, ClientEnv, ConfigFormat, LoggingLevel, load_client_config_from_str,
};
use account_client_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    let path = workspace_root()
        .join("crates")
        .join("testkit")
        .join("fixtures")
        .join(relative);
    Ok(fs::read_to_string(path)?)
}

#[test]
fn parses_valid_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/client-config.valid.json")?;
    let config = load_client_config_from_str(Some((&contents, ConfigFormat::Json)), &ClientEnv::default())?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(
        config.endpoint().as_str(),
        "https://accounts.example.com/graphql",
        "endpoint should be trimmed"
    );
    assert_eq!(config.timeout(), Duration::from_millis(45_000));
    assert_eq!(config.headers.get("x-tenant").map(String::as_str), Some("school-1"));
    assert_eq!(
        config.bearer_token.as_ref().map(|token| token.expose()),
        Some("fixture-token")
    );
    assert_eq!(config.pagination.default_limit, 50);
    assert_eq!(config.logging.level, LoggingLevel::Debug);

    Ok(())
}

#[test]
fn parses_default_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/client-config.default.toml")?;
    let config = load_client_config_from_str(Some((&contents, ConfigFormat::Toml)), &ClientEnv::default())?;

    assert_eq!(config.timeout_ms, 30_000);
    assert_eq!(config.pagination.default_limit, 25);
    assert!(config.bearer_token.is_none());

    Ok(())
}

#[test]
fn invalid_fixture_reports_error_code() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/client-config.invalid.json")?;
    let error = load_client_config_from_str(Some((&contents, ConfigFormat::Json)), &ClientEnv::default())
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_timeout"));
    assert_eq!(
        error.metadata.get("field").map(String::as_str),
        Some("timeoutMs")
    );
    assert_eq!(error.metadata.get("value_ms").map(String::as_str), Some("10"));

    Ok(())
}
