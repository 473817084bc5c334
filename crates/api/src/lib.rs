//! # account-client-api
//!
//! GraphQL wire contracts for the account service:
//!
//! - **Inputs** - typed arguments and their field-bag form
//! - **Schemas** - declarative rule tables per input
//! - **Fragment** - the user field whitelist and `UserFields` fragment
//! - **Documents** - query and mutation text
//! - **Envelope** - `ApiResponse`, `GraphqlError`, `RemoteError`
//! - **Wire** - decoding and encoding of users and pages
//!
//! This crate depends only on `domain` and `shared`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod documents;
pub mod envelope;
pub mod fragment;
pub mod inputs;
pub mod schemas;
pub mod wire;

pub use documents::{DELETE_USER, Operation};
pub use envelope::{
    ApiResponse, GraphqlError, GraphqlLocation, GraphqlPathSegment, RemoteError, UNKNOWN_ERROR,
};
pub use fragment::{FRAGMENT_NAME, FieldSelection, SelectionError};
pub use inputs::{CreateUserInput, GetUserArgs, IntoFieldBag, UpdateUserInput};
pub use wire::{DecodeError, decode_page, decode_user, encode_page, encode_user};

/// Returns the api crate version.
#[must_use]
pub const fn api_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_domain::domain_crate_version;
    use account_client_shared::shared_crate_version;

    #[test]
    fn api_crate_compiles() {
        let version = api_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn api_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
