//! # account-client-app
//!
//! Account operations over the GraphQL transport port:
//!
//! - **`AccountService`** - get, find, search, create, update, delete
//! - **`call`** - one round trip normalized into an `ApiResponse`
//! - **`UserSearch`** - lazy page walker behind `search`
//! - **`AccountError`** - the closed failure taxonomy
//!
//! This crate depends on `api`, `ports`, `domain`, and `shared`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod account_service;
pub mod call;
pub mod error;
pub mod projection;
pub mod search;

pub use account_service::AccountService;
pub use call::{call, normalize};
pub use error::{AccountError, AccountResult, RequiredArguments};
pub use projection::IntoSelection;
pub use search::UserSearch;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
