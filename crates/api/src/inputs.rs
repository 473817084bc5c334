//! Typed inputs and their conversion into field bags.
//!
//! Only set fields are written to the bag, so an unset field is never
//! validated or sent.

use account_client_domain::{Gender, Nullable, PaginationOptions, Role, UserFilter};
use account_client_shared::{FieldBag, SecretString, format_date};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Conversion into the field bag a schema validates.
pub trait IntoFieldBag {
    /// Build the bag; unset fields stay absent.
    fn into_field_bag(self) -> FieldBag;
}

impl IntoFieldBag for FieldBag {
    fn into_field_bag(self) -> FieldBag {
        self
    }
}

impl IntoFieldBag for UserFilter {
    fn into_field_bag(self) -> FieldBag {
        serde_json::to_value(self)
            .ok()
            .and_then(FieldBag::from_value)
            .unwrap_or_default()
    }
}

impl IntoFieldBag for PaginationOptions {
    fn into_field_bag(self) -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert_opt("page", self.page);
        bag.insert_opt("offset", self.offset);
        bag.insert_opt("limit", self.limit);
        bag
    }
}

/// Lookup key for the `get` query; at least one must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUserArgs {
    /// User id.
    pub id: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Login name.
    pub username: Option<String>,
}

impl GetUserArgs {
    /// Look up by id.
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Look up by email.
    #[must_use]
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Look up by username.
    #[must_use]
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

impl IntoFieldBag for GetUserArgs {
    fn into_field_bag(self) -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert_opt("id", self.id);
        bag.insert_opt("email", self.email);
        bag.insert_opt("username", self.username);
        bag
    }
}

/// `data` of the `create` mutation.
///
/// Every field is optional at the type level; the create operation reports
/// missing required fields before validation.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    /// Email address (required).
    pub email: Option<String>,
    /// Given name (required).
    pub first_name: Option<String>,
    /// Family name (required).
    pub last_name: Option<String>,
    /// Role (required).
    pub role: Option<Role>,
    /// Plain-text password (required); only exposed when the bag is built.
    pub password: Option<SecretString>,
    /// Login name.
    pub username: Option<String>,
    /// Account enabled.
    pub active: Option<bool>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Birthday; `Nullable::Null` clears it.
    pub birthday: Option<Nullable<DateTime<Utc>>>,
    /// Group ids.
    pub groups: Option<Vec<String>>,
}

impl CreateUserInput {
    /// Input with the required fields set.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            role: Some(role),
            password: Some(password.into()),
            ..Self::default()
        }
    }
}

impl IntoFieldBag for CreateUserInput {
    fn into_field_bag(self) -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert_opt("email", self.email);
        bag.insert_opt("firstName", self.first_name);
        bag.insert_opt("lastName", self.last_name);
        bag.insert_opt("role", self.role.map(Role::as_str));
        bag.insert_opt("password", self.password.map(|secret| secret.expose().to_owned()));
        bag.insert_opt("username", self.username);
        bag.insert_opt("active", self.active);
        bag.insert_opt("gender", self.gender.map(Gender::as_str));
        bag.insert_opt("birthday", self.birthday.map(date_value));
        bag.insert_opt("groups", self.groups);
        bag
    }
}

/// `data` of the `update` mutation; only set fields are changed.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// Email address.
    pub email: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Role.
    pub role: Option<Role>,
    /// New password.
    pub password: Option<SecretString>,
    /// Login name.
    pub username: Option<String>,
    /// Account enabled.
    pub active: Option<bool>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Birthday; `Nullable::Null` clears it.
    pub birthday: Option<Nullable<DateTime<Utc>>>,
    /// Stamp the last login time.
    pub update_last_login: Option<bool>,
    /// Group ids.
    pub groups: Option<Vec<String>>,
}

impl IntoFieldBag for UpdateUserInput {
    fn into_field_bag(self) -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert_opt("email", self.email);
        bag.insert_opt("firstName", self.first_name);
        bag.insert_opt("lastName", self.last_name);
        bag.insert_opt("role", self.role.map(Role::as_str));
        bag.insert_opt("password", self.password.map(|secret| secret.expose().to_owned()));
        bag.insert_opt("username", self.username);
        bag.insert_opt("active", self.active);
        bag.insert_opt("gender", self.gender.map(Gender::as_str));
        bag.insert_opt("birthday", self.birthday.map(date_value));
        bag.insert_opt("updateLastLogin", self.update_last_login);
        bag.insert_opt("groups", self.groups);
        bag
    }
}

fn date_value(value: Nullable<DateTime<Utc>>) -> Value {
    match value {
        Nullable::Null => Value::Null,
        Nullable::Value(date) => Value::String(format_date(&date)),
    }
}
