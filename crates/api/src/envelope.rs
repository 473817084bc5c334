//! GraphQL error model and the response envelope.

use account_client_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Location in the query document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlLocation {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

/// Segment of an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphqlPathSegment {
    /// Field name.
    Key(String),
    /// List index.
    Index(i64),
}

/// Message given to error entries that could not be decoded.
pub const UNKNOWN_ERROR: &str = "UnknownError";

/// One entry of a GraphQL `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlError {
    /// Message; the account service uses it as an error code.
    pub message: String,
    /// Document locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphqlLocation>,
    /// Response path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<GraphqlPathSegment>>,
    /// Vendor extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
    /// Field violations the service attaches to argument errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Value>,
}

impl GraphqlError {
    /// Error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
            validation_errors: None,
        }
    }

    /// Decode a raw error list.
    ///
    /// Entries that are not well-formed errors are kept as
    /// [`UNKNOWN_ERROR`] with the raw entry in `extensions`.
    #[must_use]
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().map(Self::from_value).collect()
    }

    fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self {
            extensions: Some(value.clone()),
            ..Self::new(UNKNOWN_ERROR)
        })
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)?;
        if let Some(path) = self.path.as_ref() {
            let rendered = path
                .iter()
                .map(|segment| match segment {
                    GraphqlPathSegment::Key(key) => key.clone(),
                    GraphqlPathSegment::Index(index) => format!("[{index}]"),
                })
                .collect::<Vec<_>>()
                .join(".");
            write!(formatter, " (at {rendered})")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphqlError {}

impl From<GraphqlError> for ErrorEnvelope {
    fn from(error: GraphqlError) -> Self {
        Self::expected(ErrorCode::new("account", "remote_error"), error.to_string())
            .with_metadata("remote_code", error.message)
    }
}

/// Every error the service returned for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    errors: Vec<GraphqlError>,
}

impl RemoteError {
    /// Wrap an error list.
    #[must_use]
    pub const fn new(errors: Vec<GraphqlError>) -> Self {
        Self { errors }
    }

    /// Returned errors, in order.
    #[must_use]
    pub fn errors(&self) -> &[GraphqlError] {
        &self.errors
    }

    /// Returns true when any error message equals `message`.
    #[must_use]
    pub fn has_error(&self, message: &str) -> bool {
        self.errors.iter().any(|error| error.message == message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        write!(formatter, "account service returned errors: {messages}")
    }
}

impl std::error::Error for RemoteError {}

impl From<RemoteError> for ErrorEnvelope {
    fn from(error: RemoteError) -> Self {
        let codes = error
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Self::expected(ErrorCode::new("account", "remote_error"), error.to_string())
            .with_metadata("remote_codes", codes)
    }
}

/// Status, optional data and error list of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// HTTP status (200 for a clean response).
    pub status: u16,
    /// Payload, when the service produced one.
    pub data: Option<T>,
    /// GraphQL errors; empty on success.
    pub errors: Vec<GraphqlError>,
}

impl<T> ApiResponse<T> {
    /// Assemble a response.
    #[must_use]
    pub const fn new(status: u16, data: Option<T>, errors: Vec<GraphqlError>) -> Self {
        Self {
            status,
            data,
            errors,
        }
    }

    /// Clean `200` response.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self::new(200, Some(data), Vec::new())
    }

    /// Returns true when the error list is non-empty.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fail with every returned error when any exists.
    pub fn raise(&self) -> Result<(), RemoteError> {
        if self.has_errors() {
            return Err(RemoteError::new(self.errors.clone()));
        }
        Ok(())
    }

    /// Returns true when an error's message equals `message` exactly.
    #[must_use]
    pub fn has_error(&self, message: &str) -> bool {
        self.find_error(message).is_some()
    }

    /// Fail with only the error whose message equals `message`.
    pub fn raise_error(&self, message: &str) -> Result<(), GraphqlError> {
        match self.find_error(message) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Consume the response, keeping the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    fn find_error(&self, message: &str) -> Option<&GraphqlError> {
        self.errors.iter().find(|error| error.message == message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failed() -> ApiResponse<Value> {
        ApiResponse::new(
            400,
            None,
            vec![GraphqlError::new("UserNotFound"), GraphqlError::new("Forbidden")],
        )
    }

    #[test]
    fn clean_response_does_not_raise() {
        let response = ApiResponse::ok(json!({ "user": null }));
        assert!(!response.has_errors());
        assert!(response.raise().is_ok());
        assert!(response.raise_error("UserNotFound").is_ok());
    }

    #[test]
    fn raise_carries_the_full_list() {
        let error = failed().raise().err();
        assert_eq!(error.as_ref().map(|error| error.errors().len()), Some(2));
        assert!(error.is_some_and(|error| error.has_error("Forbidden")));
    }

    #[test]
    fn has_error_matches_exact_message() {
        let response = failed();
        assert!(response.has_error("UserNotFound"));
        assert!(!response.has_error("UserNot"));
        assert_eq!(
            response.raise_error("Forbidden").err().map(|error| error.message),
            Some("Forbidden".to_owned())
        );
    }

    #[test]
    fn malformed_entries_are_kept_as_unknown_errors() {
        let raw = json!({ "msg": "InternalServerError" });
        let errors = GraphqlError::from_values(&[json!({ "message": "Forbidden" }), raw.clone()]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().map(|error| error.message.as_str()), Some("Forbidden"));
        assert_eq!(errors.get(1).map(|error| error.message.as_str()), Some(UNKNOWN_ERROR));
        assert_eq!(errors.get(1).and_then(|error| error.extensions.clone()), Some(raw));
    }

    #[test]
    fn wire_errors_keep_validation_payload() -> Result<(), serde_json::Error> {
        let error: GraphqlError = serde_json::from_value(json!({
            "message": "ArgumentValidationError",
            "locations": [{ "line": 2, "column": 3 }],
            "path": ["create", 0],
            "validationErrors": [{ "property": "email" }]
        }))?;

        assert_eq!(error.locations, vec![GraphqlLocation { line: 2, column: 3 }]);
        assert!(error.validation_errors.is_some());
        assert_eq!(error.to_string(), "ArgumentValidationError (at create.[0])");
        Ok(())
    }

    #[test]
    fn remote_error_envelope_lists_codes() {
        let envelope = ErrorEnvelope::from(RemoteError::new(vec![
            GraphqlError::new("A"),
            GraphqlError::new("B"),
        ]));
        assert_eq!(envelope.code, ErrorCode::new("account", "remote_error"));
        assert_eq!(envelope.metadata.get("remote_codes").map(String::as_str), Some("A,B"));
    }
}
