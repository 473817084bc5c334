//! The user entity and its selectable fields.

use crate::primitives::{Gender, ObjectId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A value that was explicitly sent, possibly as `null`.
///
/// Wrapped in `Option` to keep three states apart: absent (`None`),
/// explicit null (`Some(Nullable::Null)`) and set (`Some(Nullable::Value)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullable<T> {
    /// Explicit `null`.
    Null,
    /// A concrete value.
    Value(T),
}

impl<T> Nullable<T> {
    /// Borrow the value when set.
    pub const fn as_value(&self) -> Option<&T> {
        match self {
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Returns true for explicit null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Serde helper for `Option<Nullable<T>>` fields: a present `null` becomes
/// `Some(Nullable::Null)` instead of `None`. Pair with `#[serde(default)]`.
pub fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Nullable<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Nullable::deserialize(deserializer).map(Some)
}

/// Flatten a tri-state field into the value it holds, if any.
pub fn present_value<T>(field: Option<&Nullable<T>>) -> Option<&T> {
    field.and_then(Nullable::as_value)
}

/// Selectable user field; wire names in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserField {
    /// `_id`
    Id,
    /// `email`
    Email,
    /// `username`
    Username,
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
    /// `role`
    Role,
    /// `gender`
    Gender,
    /// `birthday`
    Birthday,
    /// `active`
    Active,
    /// `createdAt`
    CreatedAt,
    /// `updatedAt`
    UpdatedAt,
    /// `deletedAt`
    DeletedAt,
    /// `deleted`
    Deleted,
    /// `lastLogin`
    LastLogin,
    /// `groups`
    Groups,
}

impl UserField {
    /// Every field, in canonical order.
    pub const ALL: [Self; 15] = [
        Self::Id,
        Self::Email,
        Self::Username,
        Self::FirstName,
        Self::LastName,
        Self::Role,
        Self::Gender,
        Self::Birthday,
        Self::Active,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::DeletedAt,
        Self::Deleted,
        Self::LastLogin,
        Self::Groups,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Email => "email",
            Self::Username => "username",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Role => "role",
            Self::Gender => "gender",
            Self::Birthday => "birthday",
            Self::Active => "active",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::DeletedAt => "deletedAt",
            Self::Deleted => "deleted",
            Self::LastLogin => "lastLogin",
            Self::Groups => "groups",
        }
    }

    /// Returns true for fields the service may return as `null`.
    #[must_use]
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::Gender | Self::Birthday | Self::DeletedAt | Self::LastLogin
        )
    }

    /// Returns true for fields carried as date strings on the wire.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(
            self,
            Self::Birthday | Self::CreatedAt | Self::UpdatedAt | Self::DeletedAt | Self::LastLogin
        )
    }
}

impl AsRef<str> for UserField {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error for a name that is not a user field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUserField(pub String);

impl fmt::Display for UnknownUserField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Field '{}' not a known user field.", self.0)
    }
}

impl std::error::Error for UnknownUserField {}

impl FromStr for UserField {
    type Err = UnknownUserField;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == input)
            .ok_or_else(|| UnknownUserField(input.to_owned()))
    }
}

/// Partial user record; only the selected fields are populated.
///
/// Nullable fields use `Option<Nullable<_>>` so an unselected field and a
/// selected-but-null field stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    /// Wire `_id`.
    pub id: Option<ObjectId>,
    /// Email address.
    pub email: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Account role.
    pub role: Option<Role>,
    /// Gender, nullable.
    pub gender: Option<Nullable<Gender>>,
    /// Birthday, nullable.
    pub birthday: Option<Nullable<DateTime<Utc>>>,
    /// Account enabled.
    pub active: Option<bool>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-deletion timestamp, nullable.
    pub deleted_at: Option<Nullable<DateTime<Utc>>>,
    /// Soft-deletion flag.
    pub deleted: Option<bool>,
    /// Last login timestamp, nullable.
    pub last_login: Option<Nullable<DateTime<Utc>>>,
    /// Group memberships.
    pub groups: Option<Vec<ObjectId>>,
}

impl User {
    /// Returns true when `field` carries a value or an explicit null.
    #[must_use]
    pub const fn has(&self, field: UserField) -> bool {
        match field {
            UserField::Id => self.id.is_some(),
            UserField::Email => self.email.is_some(),
            UserField::Username => self.username.is_some(),
            UserField::FirstName => self.first_name.is_some(),
            UserField::LastName => self.last_name.is_some(),
            UserField::Role => self.role.is_some(),
            UserField::Gender => self.gender.is_some(),
            UserField::Birthday => self.birthday.is_some(),
            UserField::Active => self.active.is_some(),
            UserField::CreatedAt => self.created_at.is_some(),
            UserField::UpdatedAt => self.updated_at.is_some(),
            UserField::DeletedAt => self.deleted_at.is_some(),
            UserField::Deleted => self.deleted.is_some(),
            UserField::LastLogin => self.last_login.is_some(),
            UserField::Groups => self.groups.is_some(),
        }
    }

    /// Copy keeping only `fields`; everything else becomes absent.
    #[must_use]
    pub fn project(&self, fields: &[UserField]) -> Self {
        let keep = |field: UserField| fields.contains(&field);
        Self {
            id: self.id.clone().filter(|_| keep(UserField::Id)),
            email: self.email.clone().filter(|_| keep(UserField::Email)),
            username: self.username.clone().filter(|_| keep(UserField::Username)),
            first_name: self.first_name.clone().filter(|_| keep(UserField::FirstName)),
            last_name: self.last_name.clone().filter(|_| keep(UserField::LastName)),
            role: self.role.filter(|_| keep(UserField::Role)),
            gender: self.gender.filter(|_| keep(UserField::Gender)),
            birthday: self.birthday.filter(|_| keep(UserField::Birthday)),
            active: self.active.filter(|_| keep(UserField::Active)),
            created_at: self.created_at.filter(|_| keep(UserField::CreatedAt)),
            updated_at: self.updated_at.filter(|_| keep(UserField::UpdatedAt)),
            deleted_at: self.deleted_at.filter(|_| keep(UserField::DeletedAt)),
            deleted: self.deleted.filter(|_| keep(UserField::Deleted)),
            last_login: self.last_login.filter(|_| keep(UserField::LastLogin)),
            groups: self.groups.clone().filter(|_| keep(UserField::Groups)),
        }
    }
}
