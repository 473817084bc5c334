//! Config loading helpers (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{ClientConfig, ClientEnv, ValidatedClientConfig, apply_env_overrides};
use account_client_shared::{ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Config file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension; no extension means JSON.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Load the client config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`ClientEnv`)
/// - config document
/// - defaults (`ClientConfig::default()`)
pub fn load_client_config_from_str(
    config_text: Option<(&str, ConfigFormat)>,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config = match config_text {
        None => ClientConfig::default(),
        Some((input, format)) => parse_config_unvalidated(input, format)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the client config from an optional file path.
pub fn load_client_config_from_path(
    config_path: Option<&Path>,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    match config_path {
        None => load_client_config_from_str(None, env),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = ConfigFormat::from_path(path)?;
            load_client_config_from_str(Some((&config_text, format)), env)
        },
    }
}

/// Load the client config from std env and an optional file path.
pub fn load_client_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let env = ClientEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_client_config_from_path(config_path, &env)
}

fn parse_config_unvalidated(input: &str, format: ConfigFormat) -> Result<ClientConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}
