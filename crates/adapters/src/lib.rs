//! # account-client-adapters
//!
//! Adapter implementations for ports: the reqwest GraphQL transport and the
//! JSON logger. This crate depends on `ports`, `shared`, and `config`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// HTTP GraphQL transport.
#[cfg(feature = "http")]
pub mod http_transport;
pub mod log_sink;
pub mod logger;

#[cfg(feature = "http")]
pub use http_transport::{HttpGraphqlTransport, HttpTransportConfig};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_ports::ports_crate_version;
    use account_client_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("account-client-") {
                let key = line.split('=').next().unwrap_or("").trim();
                deps.push(key.split('.').next().unwrap_or("").trim().to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_or_api() {
        let deps = workspace_deps();
        let forbidden = ["account-client-app", "account-client-api"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
