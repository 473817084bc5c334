//! # account-client-shared
//!
//! Foundational types used by every other crate in the account-client workspace:
//!
//! - Result and error envelope types
//! - Secret redaction helpers
//! - The field-bag schema validation engine and its rule library
//! - Lenient date parsing for date-like inputs
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Declarative validation** - Schemas are plain rule tables, not derive magic
//! 3. **Serde-compatible** - Public data types support serialization

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod dates;
pub mod errors;
pub mod invariants;
pub mod redaction;
pub mod result;
pub mod rules;
pub mod validation;

pub use dates::{format_date, parse_date_like, parse_date_str};
pub use errors::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, REDACTED_VALUE,
};
pub use invariants::{BoundedU64, BoundsError, Validated};
pub use redaction::{REDACTED, SecretString, is_secret_key, redact_if_secret, redact_json};
pub use result::{Result, ResultExt};
pub use validation::{
    FieldBag, FieldViolation, Rule, Schema, UNKNOWN_FIELD_CONSTRAINT, ValidationErrors,
    only_if_present,
};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
