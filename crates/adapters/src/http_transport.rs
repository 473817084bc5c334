//! reqwest-backed GraphQL transport.

use account_client_config::ValidatedClientConfig;
use account_client_ports::{BoxFuture, GraphqlTransport, TransportError};
use account_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope, SecretString};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// GraphQL endpoint.
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Optional bearer token.
    pub bearer_token: Option<SecretString>,
}

impl HttpTransportConfig {
    /// Build from a validated client config.
    #[must_use]
    pub fn from_client_config(config: &ValidatedClientConfig) -> Self {
        Self {
            endpoint: config.endpoint().clone(),
            timeout: config.timeout(),
            headers: config.headers.clone(),
            bearer_token: config.bearer_token.clone(),
        }
    }
}

/// GraphQL transport that POSTs `{query, variables}` as JSON.
#[derive(Debug, Clone)]
pub struct HttpGraphqlTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGraphqlTransport {
    /// Create a new transport.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, ErrorEnvelope> {
        if config.timeout.is_zero() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let invalid = || {
                ErrorEnvelope::expected(ErrorCode::invalid_input(), "header contains invalid characters")
                    .with_metadata("header", name.clone())
            };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(name, value);
        }
        if let Some(token) = config.bearer_token.as_ref() {
            let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                .map_err(|_| {
                    ErrorEnvelope::expected(
                        ErrorCode::invalid_input(),
                        "bearer token contains invalid header characters",
                    )
                })?;
            auth_header.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("transport", "client_init_failed"),
                    format!("failed to build HTTP client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Target endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        let body = GraphqlRequest { query, variables };
        tracing::debug!(endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error))?;

        let status = response.status().as_u16();
        let payload = response
            .bytes()
            .await
            .map_err(|error| map_reqwest_error(&error))?;
        tracing::debug!(status, bytes = payload.len(), "received GraphQL response");

        interpret_response(status, &payload)
    }
}

impl GraphqlTransport for HttpGraphqlTransport {
    fn request(&self, query: &str, variables: Value) -> BoxFuture<'_, Result<Value, TransportError>> {
        let query = query.to_owned();
        Box::pin(async move { self.send(&query, variables).await })
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GraphqlResponse {
    data: Option<Value>,
    errors: Option<Vec<Value>>,
}

/// Map a raw HTTP answer onto the transport contract.
fn interpret_response(status: u16, payload: &[u8]) -> Result<Value, TransportError> {
    let success = (200..300).contains(&status);
    let parsed = serde_json::from_slice::<GraphqlResponse>(payload);

    match parsed {
        Ok(GraphqlResponse {
            data,
            errors: Some(errors),
        }) if !errors.is_empty() => Err(TransportError::Graphql {
            status,
            data: data.filter(|data| !data.is_null()),
            errors,
        }),
        Ok(response) if success => response.data.ok_or_else(|| TransportError::Decode {
            message: "response carries neither data nor errors".to_owned(),
        }),
        Err(error) if success => Err(TransportError::Decode {
            message: error.to_string(),
        }),
        _ => Err(TransportError::Http {
            status,
            body: truncate(&String::from_utf8_lossy(payload)),
        }),
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_owned();
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}

fn map_reqwest_error(error: &reqwest::Error) -> TransportError {
    if error.is_decode() {
        return TransportError::Decode {
            message: error.to_string(),
        };
    }
    TransportError::Network {
        message: error.to_string(),
        timeout: error.is_timeout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap_or_default()
    }

    #[test]
    fn clean_response_yields_data() {
        let body = bytes(&json!({ "data": { "user": null } }));
        assert_eq!(interpret_response(200, &body), Ok(json!({ "user": null })));
    }

    #[test]
    fn error_list_wins_over_status() {
        let body = bytes(&json!({ "data": null, "errors": [{ "message": "UserNotFound" }] }));
        for status in [200, 400, 500] {
            let error = interpret_response(status, &body).err();
            assert_eq!(
                error,
                Some(TransportError::Graphql {
                    status,
                    data: None,
                    errors: vec![json!({ "message": "UserNotFound" })],
                })
            );
        }
    }

    #[test]
    fn empty_error_list_is_success() {
        let body = bytes(&json!({ "data": { "deleted": true }, "errors": [] }));
        assert_eq!(interpret_response(200, &body), Ok(json!({ "deleted": true })));
    }

    #[test]
    fn non_envelope_failure_is_http_error() {
        let error = interpret_response(502, b"<html>bad gateway</html>").err();
        assert_eq!(
            error,
            Some(TransportError::Http {
                status: 502,
                body: "<html>bad gateway</html>".to_owned(),
            })
        );
    }

    #[test]
    fn undecodable_success_is_decode_error() {
        let error = interpret_response(200, b"not json").err();
        assert!(matches!(error, Some(TransportError::Decode { .. })));

        let error = interpret_response(200, b"{}").err();
        assert!(matches!(error, Some(TransportError::Decode { .. })));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let truncated = truncate(&body);
        assert_eq!(truncated.len(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }
}
