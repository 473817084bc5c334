//! Transport double that replays canned outcomes and records requests.

use account_client_api::Operation;
use account_client_ports::{BoxFuture, GraphqlTransport, TransportError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One request as seen by a test transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Operation named by the document, if recognized.
    pub operation: Option<Operation>,
    /// Full document text.
    pub query: String,
    /// Variables as sent.
    pub variables: Value,
}

impl RecordedRequest {
    /// Record `query` and `variables`.
    pub fn new(query: &str, variables: Value) -> Self {
        Self {
            operation: Operation::from_document(query),
            query: query.to_owned(),
            variables,
        }
    }
}

/// Replays queued outcomes in order, one per request.
///
/// Once the queue is empty every request fails with a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    /// Transport with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `data` payload.
    #[must_use]
    pub fn with_data(self, data: Value) -> Self {
        self.push(Ok(data));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn with_failure(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue a GraphQL error response.
    #[must_use]
    pub fn with_graphql_errors(self, status: u16, messages: &[&str]) -> Self {
        self.with_failure(crate::in_memory::graphql_failure(status, messages))
    }

    /// Queue an outcome.
    pub fn push(&self, outcome: Result<Value, TransportError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }
}

impl GraphqlTransport for ScriptedTransport {
    fn request(&self, query: &str, variables: Value) -> BoxFuture<'_, Result<Value, TransportError>> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::new(query, variables));
        let outcome = self.outcomes.lock().unwrap().pop_front();
        Box::pin(async move {
            outcome.unwrap_or_else(|| {
                Err(TransportError::Network {
                    message: "no scripted outcome left".to_owned(),
                    timeout: false,
                })
            })
        })
    }
}
