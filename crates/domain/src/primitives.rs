//! Domain primitives with validated constructors.

use account_client_shared::rules::{OBJECT_ID_LEN, is_object_id_str};
use account_client_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `ObjectId` does not have the expected length.
    InvalidObjectId {
        /// Character count of the raw input.
        input_length: usize,
    },
    /// Role token is not one of the known roles.
    UnknownRole {
        /// Raw token.
        input: String,
    },
    /// Gender token is not one of the known genders.
    UnknownGender {
        /// Raw token.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidObjectId { .. } => ErrorCode::new("domain", "invalid_object_id"),
            Self::UnknownRole { .. } => ErrorCode::new("domain", "unknown_role"),
            Self::UnknownGender { .. } => ErrorCode::new("domain", "unknown_gender"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObjectId { .. } => {
                write!(formatter, "ObjectId must be {OBJECT_ID_LEN} characters long")
            },
            Self::UnknownRole { input } => write!(formatter, "unknown role `{input}`"),
            Self::UnknownGender { input } => write!(formatter, "unknown gender `{input}`"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::InvalidObjectId { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::UnknownRole { input } | PrimitiveError::UnknownGender { input } => {
                envelope.with_metadata("input", input)
            },
        }
    }
}

/// Opaque 24-character identifier issued by the account service.
///
/// Entity ids and group ids are only length-checked; operations that address
/// a user by id additionally require the hexadecimal shape (see
/// [`ObjectId::is_hex`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(Box<str>);

impl ObjectId {
    /// Parse an identifier of exactly 24 characters.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let input_length = raw.chars().count();
        if input_length != OBJECT_ID_LEN {
            return Err(PrimitiveError::InvalidObjectId { input_length });
        }
        Ok(Self(raw.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the id is 24 hexadecimal characters.
    #[must_use]
    pub fn is_hex(&self) -> bool {
        is_object_id_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for ObjectId {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0.into()
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Manages instructors and groups.
    Manager,
    /// Teaches groups.
    Instructor,
    /// Guardian of one or more students.
    Parent,
    /// Learner account.
    Student,
}

impl Role {
    /// Every role, in wire order.
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Manager,
        Self::Instructor,
        Self::Parent,
        Self::Student,
    ];

    /// Wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Instructor => "INSTRUCTOR",
            Self::Parent => "PARENT",
            Self::Student => "STUDENT",
        }
    }
}

impl FromStr for Role {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == input)
            .ok_or_else(|| PrimitiveError::UnknownRole {
                input: input.to_owned(),
            })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Account gender. `Unknown` is the reserved default token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Not disclosed.
    Unknown,
}

impl Gender {
    /// Every gender, in wire order.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Unknown];

    /// Wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Gender {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str() == input)
            .ok_or_else(|| PrimitiveError::UnknownGender {
                input: input.to_owned(),
            })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn object_id_requires_exact_length() {
        let error = ObjectId::parse("short").err();
        assert_eq!(error, Some(PrimitiveError::InvalidObjectId { input_length: 5 }));
        assert!(ObjectId::parse("i".repeat(25)).is_err());
    }

    #[test]
    fn object_id_hex_shape_is_separate_from_length() -> Result<(), PrimitiveError> {
        let group = ObjectId::parse("i".repeat(24))?;
        assert!(!group.is_hex());

        let user = ObjectId::parse("5b2a4f6e8d1c3e0012345678")?;
        assert!(user.is_hex());
        Ok(())
    }

    #[test]
    fn roles_round_trip_through_tokens() -> Result<(), PrimitiveError> {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>()?, role);
        }
        assert!(matches!(
            "asd".parse::<Role>(),
            Err(PrimitiveError::UnknownRole { .. })
        ));
        Ok(())
    }

    #[test]
    fn gender_tokens_are_upper_case() {
        assert_eq!("UNKNOWN".parse::<Gender>().ok(), Some(Gender::Unknown));
        assert!("male".parse::<Gender>().is_err());
    }

    #[test]
    fn primitive_errors_become_expected_envelopes() {
        let envelope = ErrorEnvelope::from(PrimitiveError::UnknownRole {
            input: "ROOT".into(),
        });
        assert_eq!(envelope.code, ErrorCode::new("domain", "unknown_role"));
        assert_eq!(envelope.metadata.get("input").map(String::as_str), Some("ROOT"));
    }

    proptest! {
        #[test]
        fn hex_ids_always_parse(id in "[0-9a-f]{24}") {
            let parsed = ObjectId::parse(&id);
            prop_assert!(parsed.as_ref().is_ok_and(ObjectId::is_hex));
        }
    }
}
