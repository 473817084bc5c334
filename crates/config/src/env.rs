//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict (invalid values fail fast) and safe (secret values
//! are redacted in error metadata).

use crate::schema::{ClientConfig, LoggingLevel, ValidatedClientConfig};
use account_client_shared::{ErrorCode, ErrorEnvelope, REDACTED_VALUE, SecretString, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: GraphQL endpoint of the account service.
pub const ENV_ENDPOINT: &str = "ACCOUNT_CLIENT_ENDPOINT";
/// Env var: request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "ACCOUNT_CLIENT_TIMEOUT_MS";
/// Env var: bearer token (secret).
// gitleaks:allow
pub const ENV_TOKEN: &str = "ACCOUNT_CLIENT_TOKEN";
/// Env var: default page size.
pub const ENV_PAGE_LIMIT: &str = "ACCOUNT_CLIENT_PAGE_LIMIT";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "ACCOUNT_CLIENT_LOG_LEVEL";

const ENV_VARS: [&str; 5] = [
    ENV_ENDPOINT,
    ENV_TIMEOUT_MS,
    ENV_TOKEN,
    ENV_PAGE_LIMIT,
    ENV_LOG_LEVEL,
];

/// Typed env-derived overrides for `ClientConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientEnv {
    /// Override for `endpoint`.
    pub endpoint: Option<Box<str>>,
    /// Override for `timeoutMs`.
    pub timeout_ms: Option<u64>,
    /// Override for `bearerToken`.
    pub token: Option<SecretString>,
    /// Override for `pagination.defaultLimit`.
    pub page_limit: Option<u32>,
    /// Override for `logging.level`.
    pub log_level: Option<LoggingLevel>,
}

impl ClientEnv {
    /// Parse overrides from an explicit variable map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            endpoint: parse_optional_url_string(map, ENV_ENDPOINT)?,
            timeout_ms: parse_optional_u64(map, ENV_TIMEOUT_MS)?,
            token: parse_optional_secret(map, ENV_TOKEN)?,
            page_limit: parse_optional_u32(map, ENV_PAGE_LIMIT)?,
            log_level: parse_optional_log_level(map, ENV_LOG_LEVEL)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| ((*name).to_owned(), value)))
            .collect();
        Self::from_map(&map)
    }
}

/// Apply env overrides on top of `base`, then validate and normalize.
pub fn apply_env_overrides(
    base: ClientConfig,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(endpoint) = env.endpoint.as_ref() {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout_ms) = env.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(token) = env.token.as_ref() {
        config.bearer_token = Some(token.clone());
    }
    if let Some(limit) = env.page_limit {
        config.pagination.default_limit = limit;
    }
    if let Some(level) = env.log_level {
        config.logging.level = level;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid http(s) URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

fn trimmed<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    match trimmed(map, var) {
        Ok(value) => Ok(value.map(SecretString::from)),
        Err(_) => Err(EnvParseError::EmptySecret { var }),
    }
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(value) = trimmed(map, var)? else {
        return Ok(None);
    };
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: value.to_owned(),
        })
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(value) = trimmed(map, var)? else {
        return Ok(None);
    };
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: value.to_owned(),
        })
}

fn parse_optional_log_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LoggingLevel>, EnvParseError> {
    let Some(value) = trimmed(map, var)? else {
        return Ok(None);
    };
    LoggingLevel::parse(value)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: value.to_owned(),
        })
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(value) = trimmed(map, var)? else {
        return Ok(None);
    };
    let invalid = || EnvParseError::InvalidUrl {
        var,
        value: value.to_owned(),
    };
    let parsed = Url::parse(value).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }
    Ok(Some(value.into()))
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED_VALUE.to_string()
    } else {
        value.to_string()
    }
}
