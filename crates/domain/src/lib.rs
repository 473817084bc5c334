//! # account-client-domain
//!
//! Domain model for the account client, with no infrastructure dependencies:
//!
//! - **Primitives** - `ObjectId`, `Role`, `Gender`
//! - **User** - the partial `User` entity and `UserField` names
//! - **Compare** - `Compare` / `NullableCompare` range and equality predicates
//! - **Filter** - `UserFilter` and its in-process evaluator
//! - **Pagination** - options, `Page`, and the reference `paginate` algorithm
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use account_client_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod compare;
pub mod filter;
pub mod pagination;
pub mod primitives;
pub mod user;

pub use compare::{Compare, CompareValue, NullableCompare};
pub use filter::{
    CompareDate, CompareNullableDate, EqualityQuery, GenderQuery, RoleQuery, UserFilter,
};
pub use pagination::{
    ALLOWED_PAGE_LIMITS, DEFAULT_PAGE_LIMIT, MAX_PAGE, Page, PaginationError, PaginationOptions,
    is_allowed_limit, paginate,
};
pub use primitives::{Gender, ObjectId, PrimitiveError, Role};
pub use user::{Nullable, UnknownUserField, User, UserField, deserialize_present, present_value};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
