//! Compare predicates for range and equality queries.
//!
//! Evaluation order: `eq` short-circuits every range key; otherwise the
//! strict lower bound (`gt`) wins over `gte` and the strict upper bound
//! (`lt`) wins over `lte`. A predicate with no keys matches everything, and a
//! missing or null value never satisfies a range bound.

use crate::user::{Nullable, deserialize_present};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar types that can be compared by a predicate.
pub trait CompareValue: PartialOrd + Clone {}

impl CompareValue for f64 {}
impl CompareValue for i64 {}
impl CompareValue for DateTime<Utc> {}

/// `{eq?, gt?, gte?, lt?, lte?}` over a non-nullable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct Compare<T> {
    /// Equal to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<T>,
    /// Strictly greater than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<T>,
    /// Greater than or equal to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<T>,
    /// Strictly less than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<T>,
    /// Less than or equal to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<T>,
}

impl<T> Default for Compare<T> {
    fn default() -> Self {
        Self {
            eq: None,
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }
}

impl<T: CompareValue> Compare<T> {
    /// Predicate that matches everything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Set `eq`.
    #[must_use]
    pub fn equal_to(mut self, value: T) -> Self {
        self.eq = Some(value);
        self
    }

    /// Set `gt`.
    #[must_use]
    pub fn greater_than(mut self, value: T) -> Self {
        self.gt = Some(value);
        self
    }

    /// Set `gte`.
    #[must_use]
    pub fn at_least(mut self, value: T) -> Self {
        self.gte = Some(value);
        self
    }

    /// Set `lt`.
    #[must_use]
    pub fn less_than(mut self, value: T) -> Self {
        self.lt = Some(value);
        self
    }

    /// Set `lte`.
    #[must_use]
    pub fn at_most(mut self, value: T) -> Self {
        self.lte = Some(value);
        self
    }

    /// Returns true when no key is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
    }

    /// Evaluate against a field value.
    #[must_use]
    pub fn matches(&self, value: Option<&T>) -> bool {
        if let Some(eq) = self.eq.as_ref() {
            return value == Some(eq);
        }
        in_range(
            value,
            self.gt.as_ref(),
            self.gte.as_ref(),
            self.lt.as_ref(),
            self.lte.as_ref(),
        )
    }
}

/// Compare predicate over a nullable field; `eq: null` means "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct NullableCompare<T> {
    /// Equal to, or unset when `Nullable::Null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub eq: Option<Nullable<T>>,
    /// Strictly greater than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<T>,
    /// Greater than or equal to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<T>,
    /// Strictly less than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<T>,
    /// Less than or equal to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<T>,
}

impl<T> Default for NullableCompare<T> {
    fn default() -> Self {
        Self {
            eq: None,
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }
}

impl<T: CompareValue> NullableCompare<T> {
    /// Predicate that matches everything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Match only unset (`null`) values.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            eq: Some(Nullable::Null),
            ..Self::default()
        }
    }

    /// Set `eq`.
    #[must_use]
    pub fn equal_to(mut self, value: T) -> Self {
        self.eq = Some(Nullable::Value(value));
        self
    }

    /// Set `gt`.
    #[must_use]
    pub fn greater_than(mut self, value: T) -> Self {
        self.gt = Some(value);
        self
    }

    /// Set `gte`.
    #[must_use]
    pub fn at_least(mut self, value: T) -> Self {
        self.gte = Some(value);
        self
    }

    /// Set `lt`.
    #[must_use]
    pub fn less_than(mut self, value: T) -> Self {
        self.lt = Some(value);
        self
    }

    /// Set `lte`.
    #[must_use]
    pub fn at_most(mut self, value: T) -> Self {
        self.lte = Some(value);
        self
    }

    /// Evaluate against a field value; `None` is an unset field.
    #[must_use]
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self.eq.as_ref() {
            Some(Nullable::Null) => value.is_none(),
            Some(Nullable::Value(eq)) => value == Some(eq),
            None => in_range(
                value,
                self.gt.as_ref(),
                self.gte.as_ref(),
                self.lt.as_ref(),
                self.lte.as_ref(),
            ),
        }
    }
}

impl<T> From<Compare<T>> for NullableCompare<T> {
    fn from(compare: Compare<T>) -> Self {
        Self {
            eq: compare.eq.map(Nullable::Value),
            gt: compare.gt,
            gte: compare.gte,
            lt: compare.lt,
            lte: compare.lte,
        }
    }
}

fn in_range<T: PartialOrd>(
    value: Option<&T>,
    gt: Option<&T>,
    gte: Option<&T>,
    lt: Option<&T>,
    lte: Option<&T>,
) -> bool {
    if gt.is_none() && gte.is_none() && lt.is_none() && lte.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };

    let lower = match (gt, gte) {
        (Some(bound), _) => value > bound,
        (None, Some(bound)) => value >= bound,
        (None, None) => true,
    };
    let upper = match (lt, lte) {
        (Some(bound), _) => value < bound,
        (None, Some(bound)) => value <= bound,
        (None, None) => true,
    };
    lower && upper
}
