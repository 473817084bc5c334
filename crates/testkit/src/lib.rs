//! # account-client-testkit
//!
//! Test helpers and in-memory adapters.
//! This crate depends on `api`, `domain`, `ports`, and `shared`.

pub mod fixtures;
pub mod in_memory;
pub mod logging;
pub mod scripted;

pub use in_memory::{InMemoryAccountBackend, graphql_failure};
pub use logging::{NoopLogger, RecordingLogger};
pub use scripted::{RecordedRequest, ScriptedTransport};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_ports::ports_crate_version;
    use account_client_shared::shared_crate_version;

    #[test]
    fn testkit_crate_compiles() {
        let version = testkit_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn testkit_can_use_ports_and_shared() {
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
    }

    #[test]
    fn in_memory_adapters_are_available() {
        let _ = NoopLogger::default();
        let _ = InMemoryAccountBackend::new();
        assert_eq!(ScriptedTransport::new().remaining(), 0);
    }
}
