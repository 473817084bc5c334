//! Client configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims strings and lowercases header names.

use account_client_domain::{ALLOWED_PAGE_LIMITS, DEFAULT_PAGE_LIMIT, is_allowed_limit};
use account_client_shared::{BoundedU64, ErrorCode, ErrorEnvelope, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Sanitizes a URL for error messages by stripping credentials.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Smallest accepted request timeout (ms).
pub const TIMEOUT_MIN_MS: u64 = 1_000;
/// Largest accepted request timeout (ms).
pub const TIMEOUT_MAX_MS: u64 = 600_000;
/// Request timeout used when none is configured (ms).
pub const TIMEOUT_DEFAULT_MS: u64 = 30_000;

const HEADERS_MAX: usize = 64;

/// Bounded request timeout.
pub type TimeoutMs = BoundedU64<TIMEOUT_MIN_MS, TIMEOUT_MAX_MS>;

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ClientConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// GraphQL endpoint of the account service (http or https).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Box<str>>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra headers sent with every request.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Bearer token sent as `Authorization`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<SecretString>,
    /// Pagination defaults.
    pub pagination: PaginationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            endpoint: None,
            timeout_ms: TIMEOUT_DEFAULT_MS,
            headers: BTreeMap::new(),
            bearer_token: None,
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `endpoint` with every other value defaulted.
    #[must_use]
    pub fn for_endpoint(endpoint: impl Into<Box<str>>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedClientConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        let endpoint = validate_endpoint(self.endpoint.as_deref())?;
        self.endpoint = Some(endpoint.as_str().into());

        let timeout = TimeoutMs::try_new(self.timeout_ms).map_err(|error| {
            ConfigSchemaError::TimeoutOutOfRange {
                field: "timeoutMs",
                value_ms: error.value,
                min_ms: error.min,
                max_ms: error.max,
            }
        })?;

        self.headers = normalize_headers(std::mem::take(&mut self.headers))?;

        if let Some(token) = self.bearer_token.take() {
            let trimmed = token.expose().trim();
            if trimmed.is_empty() {
                return Err(ConfigSchemaError::EmptyBearerToken);
            }
            self.bearer_token = Some(SecretString::from(trimmed));
        }

        if !is_allowed_limit(self.pagination.default_limit) {
            return Err(ConfigSchemaError::InvalidPageLimit {
                value: self.pagination.default_limit,
            });
        }

        Ok(ValidatedClientConfig {
            raw: self,
            url: endpoint,
            timeout,
        })
    }
}

fn validate_endpoint(endpoint: Option<&str>) -> Result<Url, ConfigSchemaError> {
    let trimmed = endpoint.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ConfigSchemaError::MissingEndpoint);
    }
    let invalid = || ConfigSchemaError::InvalidUrl {
        field: "endpoint",
        url: sanitize_url_for_error(trimmed),
    };
    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }
    Ok(parsed)
}

fn normalize_headers(
    headers: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConfigSchemaError> {
    if headers.len() > HEADERS_MAX {
        return Err(ConfigSchemaError::TooManyHeaders {
            len: headers.len(),
            max: HEADERS_MAX,
        });
    }

    let mut normalized = BTreeMap::new();
    for (name, value) in headers {
        let name = name.trim().to_ascii_lowercase();
        let is_token = !name.is_empty()
            && name
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte));
        if !is_token {
            return Err(ConfigSchemaError::InvalidHeader {
                name,
                reason: "name must be a non-empty HTTP token",
            });
        }
        if value.chars().any(char::is_control) {
            return Err(ConfigSchemaError::InvalidHeader {
                name,
                reason: "value must not contain control characters",
            });
        }
        normalized.insert(name, value.trim().to_owned());
    }
    Ok(normalized)
}

/// Pagination defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PaginationConfig {
    /// Page size applied when a request names none.
    pub default_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Minimum severity written by the logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    /// Everything.
    Debug,
    /// Operation outcomes.
    #[default]
    Info,
    /// Rejections and remote errors.
    Warn,
    /// Failures only.
    Error,
}

impl LoggingLevel {
    /// Parse a level name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level.
    pub level: LoggingLevel,
}

/// Validated config wrapper carrying the parsed endpoint and bounded timeout.
#[derive(Debug, Clone)]
pub struct ValidatedClientConfig {
    raw: ClientConfig,
    url: Url,
    timeout: TimeoutMs,
}

impl ValidatedClientConfig {
    /// Parsed endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.url
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout.get())
    }
}

impl std::ops::Deref for ValidatedClientConfig {
    type Target = ClientConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Config validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this crate.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// No endpoint was configured.
    MissingEndpoint,
    /// A URL entry is invalid.
    InvalidUrl {
        /// Field name in the config file.
        field: &'static str,
        /// Invalid URL value, credentials stripped.
        url: String,
    },
    /// A timeout value is out of bounds.
    TimeoutOutOfRange {
        /// Field name in the config file.
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// Default page size is not an allowed limit.
    InvalidPageLimit {
        /// Value provided.
        value: u32,
    },
    /// A header entry is invalid.
    InvalidHeader {
        /// Normalized header name.
        name: String,
        /// Human readable reason.
        reason: &'static str,
    },
    /// Too many extra headers.
    TooManyHeaders {
        /// Number of entries.
        len: usize,
        /// Maximum allowed number of entries.
        max: usize,
    },
    /// Bearer token is present but blank.
    EmptyBearerToken,
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::MissingEndpoint => ErrorCode::new("config", "missing_endpoint"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::InvalidPageLimit { .. } => ErrorCode::new("config", "invalid_page_limit"),
            Self::InvalidHeader { .. } | Self::TooManyHeaders { .. } => {
                ErrorCode::new("config", "invalid_header")
            },
            Self::EmptyBearerToken => ErrorCode::new("config", "empty_bearer_token"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::MissingEndpoint => formatter.write_str("endpoint must be set"),
            Self::InvalidUrl { field, url } => {
                write!(formatter, "{field} must be an http(s) URL: {url}")
            },
            Self::TimeoutOutOfRange {
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{field} must be between {min_ms} and {max_ms} ms (got {value_ms})"
            ),
            Self::InvalidPageLimit { value } => write!(
                formatter,
                "pagination.defaultLimit must be one of {ALLOWED_PAGE_LIMITS:?} (got {value})"
            ),
            Self::InvalidHeader { name, reason } => {
                write!(formatter, "invalid header `{name}`: {reason}")
            },
            Self::TooManyHeaders { len, max } => {
                write!(formatter, "too many headers ({len}, max {max})")
            },
            Self::EmptyBearerToken => formatter.write_str("bearerToken must be non-empty"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => {
                envelope = envelope
                    .with_metadata("found", found.to_string())
                    .with_metadata("supported", supported.to_string());
            },
            ConfigSchemaError::InvalidUrl { field, url } => {
                envelope = envelope
                    .with_metadata("field", field)
                    .with_metadata("url", url);
            },
            ConfigSchemaError::TimeoutOutOfRange {
                field,
                value_ms,
                min_ms,
                max_ms,
            } => {
                envelope = envelope
                    .with_metadata("field", field)
                    .with_metadata("value_ms", value_ms.to_string())
                    .with_metadata("min_ms", min_ms.to_string())
                    .with_metadata("max_ms", max_ms.to_string());
            },
            ConfigSchemaError::InvalidPageLimit { value } => {
                envelope = envelope
                    .with_metadata("field", "pagination.defaultLimit")
                    .with_metadata("value", value.to_string());
            },
            ConfigSchemaError::InvalidHeader { name, .. } => {
                envelope = envelope.with_metadata("header", name);
            },
            ConfigSchemaError::TooManyHeaders { len, max } => {
                envelope = envelope
                    .with_metadata("len", len.to_string())
                    .with_metadata("max", max.to_string());
            },
            ConfigSchemaError::MissingEndpoint => {
                envelope = envelope.with_metadata("field", "endpoint");
            },
            ConfigSchemaError::EmptyBearerToken => {
                envelope = envelope.with_metadata("field", "bearerToken");
            },
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_need_only_an_endpoint() -> Result<(), ConfigSchemaError> {
        let config = ClientConfig::for_endpoint(" http://localhost:4000/graphql ").validate_and_normalize()?;

        assert_eq!(config.endpoint().as_str(), "http://localhost:4000/graphql");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4000/graphql"));
        assert_eq!(config.timeout(), Duration::from_millis(TIMEOUT_DEFAULT_MS));
        assert_eq!(config.pagination.default_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.logging.level, LoggingLevel::Info);
        Ok(())
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let error = ClientConfig::default().validate_and_normalize().err();
        assert_eq!(error, Some(ConfigSchemaError::MissingEndpoint));
    }

    #[test]
    fn invalid_url_error_strips_credentials() -> Result<(), Box<dyn std::error::Error>> {
        let error = ClientConfig::for_endpoint("ftp://user:pw@example.com/graphql") // pragma: allowlist secret
            .validate_and_normalize()
            .err();
        let url = match error {
            Some(ConfigSchemaError::InvalidUrl { url, .. }) => url,
            other => return Err(format!("expected invalid url, got {other:?}").into()),
        };
        assert!(!url.contains("pw"));
        assert!(!url.contains("user"));
        Ok(())
    }

    #[test]
    fn header_names_are_lowercased() -> Result<(), ConfigSchemaError> {
        let mut config = ClientConfig::for_endpoint("https://accounts.example.com/graphql");
        config.headers.insert("X-Tenant".into(), " school-1 ".into());
        let config = config.validate_and_normalize()?;

        assert_eq!(config.headers.get("x-tenant").map(String::as_str), Some("school-1"));
        Ok(())
    }

    #[test]
    fn bad_header_name_is_rejected() {
        let mut config = ClientConfig::for_endpoint("https://accounts.example.com/graphql");
        config.headers.insert("bad header".into(), "x".into());
        let error = config.validate_and_normalize().err();
        assert!(matches!(error, Some(ConfigSchemaError::InvalidHeader { .. })));
    }

    #[test]
    fn page_limit_must_be_allowed() {
        let mut config = ClientConfig::for_endpoint("https://accounts.example.com/graphql");
        config.pagination.default_limit = 20;
        let envelope = config.validate_and_normalize().err().map(ErrorEnvelope::from);

        assert_eq!(
            envelope.map(|envelope| envelope.code),
            Some(ErrorCode::new("config", "invalid_page_limit"))
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let mut config = ClientConfig::for_endpoint("https://accounts.example.com/graphql");
        config.bearer_token = Some(SecretString::from("   "));
        assert_eq!(
            config.validate_and_normalize().err(),
            Some(ConfigSchemaError::EmptyBearerToken)
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = serde_json::from_str::<ClientConfig>(r#"{"endpoint": "http://x.io", "retries": 3}"#);
        assert!(error.is_err());
    }

    proptest! {
        #[test]
        fn timeout_accepted_only_within_bounds(timeout_ms in 0_u64..1_000_000) {
            let mut config = ClientConfig::for_endpoint("http://localhost/graphql");
            config.timeout_ms = timeout_ms;
            let accepted = config.validate_and_normalize().is_ok();
            prop_assert_eq!(accepted, (TIMEOUT_MIN_MS..=TIMEOUT_MAX_MS).contains(&timeout_ms));
        }
    }
}
