//! # account-client-config
//!
//! Configuration schema, validation, and loading for the account client.
//! This crate depends on `domain` and `shared` only.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ClientEnv, ENV_ENDPOINT, ENV_LOG_LEVEL, ENV_PAGE_LIMIT, ENV_TIMEOUT_MS, ENV_TOKEN,
    EnvParseError, apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_client_config_from_path, load_client_config_from_str,
    load_client_config_std_env,
};
pub use schema::{
    CURRENT_CONFIG_VERSION, ClientConfig, ConfigSchemaError, LoggingConfig, LoggingLevel,
    PaginationConfig, TIMEOUT_DEFAULT_MS, TIMEOUT_MAX_MS, TIMEOUT_MIN_MS, TimeoutMs,
    ValidatedClientConfig,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
