//! Failure taxonomy of the account operations.

use account_client_api::{DecodeError, RemoteError, SelectionError};
use account_client_ports::TransportError;
use account_client_shared::{ErrorCode, ErrorEnvelope, ValidationErrors};
use std::fmt;

/// Result alias for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Arguments an operation needed but did not receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredArguments {
    /// At least one of these must be given.
    OneOf(Vec<&'static str>),
    /// Every listed argument was missing.
    All(Vec<&'static str>),
}

impl RequiredArguments {
    /// Argument names, in declaration order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        match self {
            Self::OneOf(names) | Self::All(names) => names,
        }
    }
}

impl fmt::Display for RequiredArguments {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneOf(names) => write!(formatter, "One of argument '{}' required.", names.join(", ")),
            Self::All(names) if names.len() == 1 => {
                write!(formatter, "Argument '{}' required.", names.join(""))
            },
            Self::All(names) => write!(formatter, "Arguments '{}' required.", names.join(", ")),
        }
    }
}

/// Every way an account operation can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountError {
    /// A required argument was absent before validation ran.
    ArgumentRequired(RequiredArguments),
    /// The projection was empty.
    FieldRequired,
    /// The projection named something that is not a user field.
    UnknownField(String),
    /// Arguments failed schema validation; every offending field is listed.
    Validation(ValidationErrors),
    /// The response did not have the shape the operation expects.
    UnexpectedResponse,
    /// The service answered with GraphQL errors.
    Remote(RemoteError),
    /// The transport failed without a GraphQL error list.
    Transport(TransportError),
}

impl AccountError {
    /// Returns true when validation failed on `field`.
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        matches!(self, Self::Validation(errors) if errors.has_error(field))
    }

    /// Returns true when validation failed on `field` for `constraint`.
    #[must_use]
    pub fn has_constraint(&self, field: &str, constraint: &str) -> bool {
        matches!(self, Self::Validation(errors) if errors.has_constraint(field, constraint))
    }

    /// Returns true when the service reported an error whose message is `message`.
    #[must_use]
    pub fn has_remote_error(&self, message: &str) -> bool {
        matches!(self, Self::Remote(error) if error.has_error(message))
    }

    /// Validation details, when this is a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::ArgumentRequired(_) => ErrorCode::new("account", "argument_required"),
            Self::FieldRequired => ErrorCode::new("account", "field_required"),
            Self::UnknownField(_) => ErrorCode::new("account", "unknown_field"),
            Self::Validation(_) => ErrorCode::validation_failed(),
            Self::UnexpectedResponse => ErrorCode::new("account", "unexpected_response"),
            Self::Remote(_) => ErrorCode::new("account", "remote_error"),
            Self::Transport(_) => ErrorCode::new("transport", "failed"),
        }
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentRequired(arguments) => write!(formatter, "{arguments}"),
            Self::FieldRequired => formatter.write_str("At least one user field required"),
            Self::UnknownField(field) => write!(formatter, "Field '{field}' not a known user field."),
            Self::Validation(errors) => write!(formatter, "{errors}"),
            Self::UnexpectedResponse => formatter.write_str("API returned an unexpected response."),
            Self::Remote(error) => write!(formatter, "{error}"),
            Self::Transport(error) => write!(formatter, "{error}"),
        }
    }
}

impl std::error::Error for AccountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Remote(error) => Some(error),
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }
}

impl From<SelectionError> for AccountError {
    fn from(error: SelectionError) -> Self {
        match error {
            SelectionError::Empty => Self::FieldRequired,
            SelectionError::UnknownField(field) => Self::UnknownField(field),
        }
    }
}

impl From<ValidationErrors> for AccountError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RemoteError> for AccountError {
    fn from(error: RemoteError) -> Self {
        Self::Remote(error)
    }
}

impl From<TransportError> for AccountError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl From<DecodeError> for AccountError {
    fn from(_: DecodeError) -> Self {
        Self::UnexpectedResponse
    }
}

impl From<AccountError> for ErrorEnvelope {
    fn from(error: AccountError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        match error {
            AccountError::ArgumentRequired(arguments) => Self::expected(code, message)
                .with_metadata("arguments", arguments.names().join(",")),
            AccountError::UnknownField(field) => {
                Self::expected(code, message).with_metadata("field", field)
            },
            AccountError::FieldRequired => Self::expected(code, message),
            AccountError::UnexpectedResponse => Self::invariant(code, message),
            AccountError::Validation(errors) => errors.into(),
            AccountError::Remote(error) => error.into(),
            AccountError::Transport(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_api::GraphqlError;
    use account_client_shared::{ErrorClass, ErrorKind};

    #[test]
    fn argument_messages() {
        let one_of = RequiredArguments::OneOf(vec!["id", "email", "username"]);
        assert_eq!(one_of.to_string(), "One of argument 'id, email, username' required.");
        assert_eq!(RequiredArguments::All(vec!["email"]).to_string(), "Argument 'email' required.");
        assert_eq!(
            RequiredArguments::All(vec!["email", "password"]).to_string(),
            "Arguments 'email, password' required."
        );
    }

    #[test]
    fn selection_errors_map_to_field_kinds() {
        assert_eq!(AccountError::from(SelectionError::Empty), AccountError::FieldRequired);
        assert_eq!(
            AccountError::from(SelectionError::UnknownField("password".into())).to_string(),
            "Field 'password' not a known user field."
        );
    }

    #[test]
    fn validation_queries_only_match_validation_errors() {
        let mut errors = ValidationErrors::new("CreateInput");
        errors.push("email", "isEmail", "email must be an email");
        let error = AccountError::from(errors);

        assert!(error.has_error("email"));
        assert!(error.has_constraint("email", "isEmail"));
        assert!(!error.has_constraint("email", "length"));
        assert!(!error.has_error("username"));
        assert!(!AccountError::UnexpectedResponse.has_error("email"));
    }

    #[test]
    fn remote_error_lookup() {
        let error = AccountError::from(RemoteError::new(vec![GraphqlError::new("UserNotFound")]));
        assert!(error.has_remote_error("UserNotFound"));
        assert!(!error.has_remote_error("Forbidden"));
    }

    #[test]
    fn envelope_codes_and_kinds() {
        let envelope = ErrorEnvelope::from(AccountError::ArgumentRequired(RequiredArguments::OneOf(
            vec!["id", "email"],
        )));
        assert_eq!(envelope.code, ErrorCode::new("account", "argument_required"));
        assert_eq!(envelope.metadata.get("arguments").map(String::as_str), Some("id,email"));

        let envelope = ErrorEnvelope::from(AccountError::UnexpectedResponse);
        assert_eq!(envelope.kind, ErrorKind::Invariant);

        let envelope = ErrorEnvelope::from(AccountError::Transport(TransportError::Network {
            message: "connection refused".into(),
            timeout: false,
        }));
        assert_eq!(envelope.class, ErrorClass::Retriable);
    }
}
