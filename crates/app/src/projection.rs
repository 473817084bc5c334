//! Caller-side projections accepted by the account operations.

use account_client_api::{FieldSelection, SelectionError};
use account_client_domain::UserField;

/// Anything that names the user fields an operation should return.
pub trait IntoSelection {
    /// Resolve into a checked selection.
    fn into_selection(self) -> Result<FieldSelection, SelectionError>;
}

impl IntoSelection for FieldSelection {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        Ok(self)
    }
}

impl IntoSelection for &FieldSelection {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        Ok(self.clone())
    }
}

impl IntoSelection for &[UserField] {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        FieldSelection::new(self.iter().copied())
    }
}

impl<const N: usize> IntoSelection for [UserField; N] {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        FieldSelection::new(self)
    }
}

impl IntoSelection for &[&str] {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        FieldSelection::parse(self)
    }
}

impl<const N: usize> IntoSelection for [&str; N] {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        FieldSelection::parse(self)
    }
}

impl IntoSelection for Vec<String> {
    fn into_selection(self) -> Result<FieldSelection, SelectionError> {
        FieldSelection::parse(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_fields_resolve_alike() -> Result<(), SelectionError> {
        let by_name = ["_id", "email"].into_selection()?;
        let by_field = [UserField::Id, UserField::Email].into_selection()?;
        assert_eq!(by_name, by_field);
        Ok(())
    }

    #[test]
    fn empty_and_unknown_are_rejected() {
        let empty: &[&str] = &[];
        assert_eq!(empty.into_selection(), Err(SelectionError::Empty));
        assert_eq!(
            vec!["email".to_owned(), "password".to_owned()].into_selection(),
            Err(SelectionError::UnknownField("password".to_owned()))
        );
    }
}
