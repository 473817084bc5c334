//! # account-client
//!
//! Facade API for consumers of the account service.
//! This crate wires the config, adapters, and app layers together and
//! re-exports the types a caller needs.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use account_client_adapters::{HttpGraphqlTransport, HttpTransportConfig, JsonLogger, LogSink, StderrLogSink};
use account_client_ports::LogLevel;
use std::path::Path;
use std::sync::Arc;

pub use account_client_api::{
    CreateUserInput, FieldSelection, GetUserArgs, GraphqlError, IntoFieldBag, RemoteError,
    SelectionError, UpdateUserInput,
};
pub use account_client_app::{
    AccountError, AccountResult, AccountService, IntoSelection, RequiredArguments, UserSearch,
};
pub use account_client_config::{
    ClientConfig, ClientEnv, LoggingLevel, ValidatedClientConfig, load_client_config_from_path,
    load_client_config_std_env,
};
pub use account_client_domain::{
    CompareDate, CompareNullableDate, Gender, GenderQuery, Nullable, ObjectId, Page,
    PaginationOptions, Role, RoleQuery, User, UserField, UserFilter,
};
pub use account_client_ports::{GraphqlTransport, LoggerPort, TransportError};
pub use account_client_shared::{ErrorEnvelope, FieldBag, SecretString, ValidationErrors};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Logger level matching a configured logging level.
#[must_use]
pub const fn log_level(level: LoggingLevel) -> LogLevel {
    match level {
        LoggingLevel::Debug => LogLevel::Debug,
        LoggingLevel::Info => LogLevel::Info,
        LoggingLevel::Warn => LogLevel::Warn,
        LoggingLevel::Error => LogLevel::Error,
    }
}

/// Build a service over HTTP, logging JSON lines to stderr.
pub fn connect(config: &ValidatedClientConfig) -> Result<AccountService, ErrorEnvelope> {
    connect_with_sink(config, Arc::new(StderrLogSink))
}

/// Build a service over HTTP, logging JSON lines to `sink`.
pub fn connect_with_sink(
    config: &ValidatedClientConfig,
    sink: Arc<dyn LogSink>,
) -> Result<AccountService, ErrorEnvelope> {
    let transport = HttpGraphqlTransport::new(&HttpTransportConfig::from_client_config(config))?;
    let logger = JsonLogger::new(sink).with_min_level(log_level(config.logging.level));
    tracing::debug!(
        endpoint = %config.endpoint(),
        default_limit = config.pagination.default_limit,
        "account client configured"
    );

    Ok(AccountService::new(Arc::new(transport))
        .with_logger(Arc::new(logger))
        .with_default_limit(config.pagination.default_limit))
}

/// Load config from the process environment and an optional file, then
/// build a service over HTTP.
pub fn connect_from_env(config_path: Option<&Path>) -> Result<AccountService, ErrorEnvelope> {
    let config = load_client_config_std_env(config_path)?;
    connect(&config)
}
