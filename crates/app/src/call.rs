//! One transport round trip, normalized into an [`ApiResponse`].

use account_client_api::{ApiResponse, GraphqlError};
use account_client_ports::{GraphqlTransport, TransportError};
use serde_json::Value;

/// Send one document and normalize the outcome.
///
/// Failures that carry a GraphQL error list become a response with those
/// errors; every other transport failure is returned unchanged.
pub async fn call(
    transport: &dyn GraphqlTransport,
    query: &str,
    variables: Value,
) -> Result<ApiResponse<Value>, TransportError> {
    normalize(transport.request(query, variables).await)
}

/// Map a raw transport outcome onto the response envelope.
pub fn normalize(outcome: Result<Value, TransportError>) -> Result<ApiResponse<Value>, TransportError> {
    match outcome {
        Ok(data) => Ok(ApiResponse::ok(data)),
        Err(TransportError::Graphql {
            status,
            data,
            errors,
        }) => Ok(ApiResponse::new(status, data, GraphqlError::from_values(&errors))),
        Err(error) => Err(error),
    }
}
