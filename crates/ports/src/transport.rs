//! GraphQL transport boundary contract.

use crate::BoxFuture;
use account_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde_json::Value;
use std::fmt;

/// Why a GraphQL request failed below the account operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The service answered with a GraphQL envelope carrying errors.
    Graphql {
        /// HTTP status of the answer.
        status: u16,
        /// Partial `data`, when present.
        data: Option<Value>,
        /// Raw entries of the `errors` list.
        errors: Vec<Value>,
    },
    /// Non-success HTTP answer that is not a GraphQL envelope.
    Http {
        /// HTTP status.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// Connection failure or timeout.
    Network {
        /// Failure description.
        message: String,
        /// Whether the request timed out.
        timeout: bool,
    },
    /// The response body could not be decoded.
    Decode {
        /// Failure description.
        message: String,
    },
}

impl TransportError {
    /// GraphQL error list, when this failure carries one.
    #[must_use]
    pub fn graphql_errors(&self) -> Option<&[Value]> {
        match self {
            Self::Graphql { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// HTTP status, when the service answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Graphql { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Network { .. } | Self::Decode { .. } => None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graphql { status, errors, .. } => write!(
                formatter,
                "GraphQL request returned {} error(s) with status {status}",
                errors.len()
            ),
            Self::Http { status, body } => {
                write!(formatter, "GraphQL request failed with status {status}: {body}")
            },
            Self::Network { message, timeout } => {
                if *timeout {
                    write!(formatter, "GraphQL request timed out: {message}")
                } else {
                    write!(formatter, "GraphQL request failed: {message}")
                }
            },
            Self::Decode { message } => write!(formatter, "failed to decode GraphQL response: {message}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for ErrorEnvelope {
    fn from(error: TransportError) -> Self {
        let message = error.to_string();
        match error {
            TransportError::Graphql { status, .. } => {
                Self::expected(ErrorCode::new("transport", "graphql_errors"), message)
                    .with_metadata("status", status.to_string())
            },
            TransportError::Http { status, .. } => {
                let class = if status >= 500 || status == 429 {
                    ErrorClass::Retriable
                } else {
                    ErrorClass::NonRetriable
                };
                Self::unexpected(ErrorCode::new("transport", "http_status"), message, class)
                    .with_metadata("status", status.to_string())
            },
            TransportError::Network { timeout: true, .. } => {
                Self::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable)
            },
            TransportError::Network { .. } => Self::unexpected(
                ErrorCode::dependency_unavailable(),
                message,
                ErrorClass::Retriable,
            ),
            TransportError::Decode { .. } => Self::unexpected(
                ErrorCode::new("transport", "invalid_response"),
                message,
                ErrorClass::NonRetriable,
            ),
        }
    }
}

/// Boundary contract for executing one GraphQL document.
///
/// `Ok` carries the `data` object of a clean response.
pub trait GraphqlTransport: Send + Sync {
    /// Send `query` with `variables` and await the answer.
    fn request(&self, query: &str, variables: Value) -> BoxFuture<'_, Result<Value, TransportError>>;
}
