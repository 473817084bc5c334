//! Field whitelist and `UserFields` fragment builder.

use account_client_domain::{UnknownUserField, UserField};
use std::fmt;

/// Name of the fragment every user query spreads.
pub const FRAGMENT_NAME: &str = "UserFields";

/// Why a field list could not become a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No field was requested.
    Empty,
    /// A requested name is not a user field.
    UnknownField(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("At least one user field required"),
            Self::UnknownField(name) => write!(formatter, "Field '{name}' not a known user field."),
        }
    }
}

impl std::error::Error for SelectionError {}

impl From<UnknownUserField> for SelectionError {
    fn from(error: UnknownUserField) -> Self {
        Self::UnknownField(error.0)
    }
}

/// Non-empty, duplicate-free, order-preserving list of user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection(Vec<UserField>);

impl FieldSelection {
    /// Every user field, in canonical order.
    #[must_use]
    pub fn all() -> Self {
        Self(UserField::ALL.to_vec())
    }

    /// Build a selection from typed fields; duplicates keep the first position.
    pub fn new(fields: impl IntoIterator<Item = UserField>) -> Result<Self, SelectionError> {
        let mut selected = Vec::new();
        for field in fields {
            if !selected.contains(&field) {
                selected.push(field);
            }
        }
        if selected.is_empty() {
            return Err(SelectionError::Empty);
        }
        Ok(Self(selected))
    }

    /// Build a selection from wire names, rejecting the first unknown name.
    pub fn parse<I, S>(names: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = names
            .into_iter()
            .map(|name| name.as_ref().parse::<UserField>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }

    /// Selected fields in request order.
    #[must_use]
    pub fn fields(&self) -> &[UserField] {
        &self.0
    }

    /// Returns true when `field` is selected.
    #[must_use]
    pub fn contains(&self, field: UserField) -> bool {
        self.0.contains(&field)
    }

    /// Render the `UserFields` fragment.
    #[must_use]
    pub fn render(&self) -> String {
        let body = self
            .0
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(",\n\t");
        format!("fragment {FRAGMENT_NAME} on User {{\n\t{body}\n\t}}")
    }

    /// Recover the selection from a document containing a rendered fragment.
    pub fn from_document(document: &str) -> Result<Self, SelectionError> {
        let header = format!("fragment {FRAGMENT_NAME} on User {{");
        let Some(start) = document.find(&header) else {
            return Err(SelectionError::Empty);
        };
        let body = document
            .get(start + header.len()..)
            .and_then(|rest| rest.split('}').next())
            .unwrap_or_default();
        Self::parse(
            body.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl TryFrom<&[UserField]> for FieldSelection {
    type Error = SelectionError;

    fn try_from(fields: &[UserField]) -> Result<Self, Self::Error> {
        Self::new(fields.iter().copied())
    }
}
