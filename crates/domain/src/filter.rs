//! User filter model and its in-process evaluator.

use crate::compare::{Compare, NullableCompare};
use crate::primitives::{Gender, ObjectId, Role};
use crate::user::{User, present_value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{eq?, in?}` query over an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct EqualityQuery<T> {
    /// Exact match; takes precedence over `in`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<T>,
    /// Membership in a set.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<T>>,
}

impl<T> Default for EqualityQuery<T> {
    fn default() -> Self {
        Self {
            eq: None,
            one_of: None,
        }
    }
}

impl<T: PartialEq> EqualityQuery<T> {
    /// Query for one exact value.
    #[must_use]
    pub const fn equal_to(value: T) -> Self {
        Self {
            eq: Some(value),
            one_of: None,
        }
    }

    /// Query for any of `values`.
    #[must_use]
    pub fn any_of(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            eq: None,
            one_of: Some(values.into_iter().collect()),
        }
    }

    /// Evaluate against a field value. An empty `in` list matches everything.
    #[must_use]
    pub fn matches(&self, value: Option<&T>) -> bool {
        if let Some(eq) = self.eq.as_ref() {
            return value == Some(eq);
        }
        match self.one_of.as_deref() {
            Some(set) if !set.is_empty() => value.is_some_and(|value| set.contains(value)),
            _ => true,
        }
    }
}

/// Role query.
pub type RoleQuery = EqualityQuery<Role>;
/// Gender query.
pub type GenderQuery = EqualityQuery<Gender>;
/// Date compare over a non-nullable field.
pub type CompareDate = Compare<DateTime<Utc>>;
/// Date compare over a nullable field.
pub type CompareNullableDate = NullableCompare<DateTime<Utc>>;

/// Filter accepted by the `find` operation. Every key is optional and the
/// present keys are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserFilter {
    /// Account enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Gender query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<GenderQuery>,
    /// Role query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleQuery>,
    /// Soft-deletion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    /// Soft-deletion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<CompareNullableDate>,
    /// Creation date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CompareDate>,
    /// Modification date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<CompareDate>,
    /// Last login date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<CompareNullableDate>,
    /// Birthday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<CompareNullableDate>,
    /// Users sharing at least one of these groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<ObjectId>>,
}

impl UserFilter {
    /// Filter that matches every user.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns true when `user` satisfies every present key.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let flag = |expected: Option<bool>, actual: Option<bool>| {
            expected.is_none_or(|expected| actual == Some(expected))
        };

        flag(self.active, user.active)
            && flag(self.deleted, user.deleted)
            && self
                .role
                .as_ref()
                .is_none_or(|query| query.matches(user.role.as_ref()))
            && self
                .gender
                .as_ref()
                .is_none_or(|query| query.matches(present_value(user.gender.as_ref())))
            && self
                .birthday
                .as_ref()
                .is_none_or(|compare| compare.matches(present_value(user.birthday.as_ref())))
            && self
                .deleted_at
                .as_ref()
                .is_none_or(|compare| compare.matches(present_value(user.deleted_at.as_ref())))
            && self
                .last_login
                .as_ref()
                .is_none_or(|compare| compare.matches(present_value(user.last_login.as_ref())))
            && self
                .created_at
                .as_ref()
                .is_none_or(|compare| compare.matches(user.created_at.as_ref()))
            && self
                .updated_at
                .as_ref()
                .is_none_or(|compare| compare.matches(user.updated_at.as_ref()))
            && self.groups_match(user)
    }

    fn groups_match(&self, user: &User) -> bool {
        let Some(wanted) = self.groups.as_deref() else {
            return true;
        };
        if wanted.is_empty() {
            return true;
        }
        user.groups
            .as_deref()
            .is_some_and(|groups| groups.iter().any(|group| wanted.contains(group)))
    }
}
