//! In-memory account service speaking the GraphQL transport contract.
//!
//! Requests are routed by operation name, the projection is read back from
//! the `UserFields` fragment, and `find` runs the domain filter evaluator
//! followed by the reference `paginate` algorithm. Intended for:
//! - Integration tests of the account operations
//! - Property tests of the page walker
//! - Local experimentation without a running service

use crate::RecordedRequest;
use account_client_api::{FieldSelection, Operation, decode_user, encode_page, encode_user};
use account_client_domain::{Nullable, ObjectId, PaginationOptions, User, UserFilter, paginate};
use account_client_ports::{BoxFuture, GraphqlTransport, TransportError};
use account_client_shared::format_date;
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Message of the error returned when an id matches no user.
pub const USER_NOT_FOUND: &str = "UserNotFound";
/// Message of the error returned for malformed arguments.
pub const ARGUMENT_VALIDATION_ERROR: &str = "ArgumentValidationError";
/// Message of the error returned for unparseable documents.
pub const GRAPHQL_VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";

/// Build a GraphQL failure with one error per message.
pub fn graphql_failure(status: u16, messages: &[&str]) -> TransportError {
    TransportError::Graphql {
        status,
        data: None,
        errors: messages
            .iter()
            .map(|message| json!({ "message": message }))
            .collect(),
    }
}

/// In-memory user store behind a GraphQL transport.
#[derive(Debug, Default)]
pub struct InMemoryAccountBackend {
    users: RwLock<Vec<User>>,
    next_id: AtomicU64,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl InMemoryAccountBackend {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `users`, in order.
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    /// Snapshot of the stored users.
    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, query: &str, variables: &Value) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::new(query, variables.clone()));
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("ff{n:022x}")
    }

    async fn handle(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        let operation = Operation::from_document(query)
            .ok_or_else(|| graphql_failure(400, &[GRAPHQL_VALIDATION_FAILED]))?;
        match operation {
            Operation::GetUser => self.get(query, &variables).await,
            Operation::FindUsers => self.find(query, &variables).await,
            Operation::CreateUser => self.create(query, &variables).await,
            Operation::UpdateUser => self.update(query, &variables).await,
            Operation::DeleteUser => self.delete(&variables).await,
        }
    }

    async fn get(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let selection = selection(query)?;
        let key = |name: &str| variables.get(name).and_then(Value::as_str);
        let (id, email, username) = (key("id"), key("email"), key("username"));
        if id.is_none() && email.is_none() && username.is_none() {
            return Err(graphql_failure(400, &[ARGUMENT_VALIDATION_ERROR]));
        }

        let users = self.users.read().await;
        let found = users.iter().find(|user| {
            id.is_none_or(|id| user.id.as_ref().map(ObjectId::as_str) == Some(id))
                && email.is_none_or(|email| user.email.as_deref() == Some(email))
                && username.is_none_or(|username| user.username.as_deref() == Some(username))
        });

        Ok(json!({
            "user": found.map_or(Value::Null, |user| project(user, &selection)),
        }))
    }

    async fn find(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let selection = selection(query)?;
        let filter: UserFilter = match variables.get("filters") {
            None | Some(Value::Null) => UserFilter::all(),
            Some(filters) => serde_json::from_value(filters.clone()).map_err(|_| invalid())?,
        };
        let pagination: PaginationOptions = match variables.get("pagination") {
            None | Some(Value::Null) => PaginationOptions::new(),
            Some(pagination) => serde_json::from_value(pagination.clone()).map_err(|_| invalid())?,
        };

        let users = self.users.read().await;
        let matched: Vec<User> = users
            .iter()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();
        let page = paginate(&matched, &pagination).map_err(|error| {
            let message = error.to_string();
            graphql_failure(400, &[message.as_str()])
        })?;

        Ok(json!({ "result": encode_page(&page, &selection) }))
    }

    async fn create(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let selection = selection(query)?;
        let data = object(variables.get("data"))?;
        let now = Value::String(format_date(&Utc::now()));

        let mut record = Map::new();
        record.insert("_id".to_owned(), Value::String(self.allocate_id()));
        record.insert("active".to_owned(), Value::Bool(true));
        record.insert("gender".to_owned(), Value::Null);
        record.insert("birthday".to_owned(), Value::Null);
        record.insert("deleted".to_owned(), Value::Bool(false));
        record.insert("deletedAt".to_owned(), Value::Null);
        record.insert("lastLogin".to_owned(), Value::Null);
        record.insert("groups".to_owned(), json!([]));
        record.insert("createdAt".to_owned(), now.clone());
        record.insert("updatedAt".to_owned(), now);
        apply(&mut record, data);

        let user = decode_user(&Value::Object(record), &FieldSelection::all()).map_err(|_| invalid())?;
        let projected = project(&user, &selection);
        self.users.write().await.push(user);
        Ok(json!({ "user": projected }))
    }

    async fn update(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let selection = selection(query)?;
        let id = variables.get("id").and_then(Value::as_str).ok_or_else(invalid)?;
        let data = object(variables.get("data"))?;

        let mut users = self.users.write().await;
        let slot = users
            .iter_mut()
            .find(|user| user.id.as_ref().map(ObjectId::as_str) == Some(id))
            .ok_or_else(|| graphql_failure(200, &[USER_NOT_FOUND]))?;

        let mut record = match encode_user(slot) {
            Value::Object(record) => record,
            _ => Map::new(),
        };
        apply(&mut record, data);
        record.insert("updatedAt".to_owned(), Value::String(format_date(&Utc::now())));

        let updated = decode_user(&Value::Object(record), &FieldSelection::all()).map_err(|_| invalid())?;
        let projected = project(&updated, &selection);
        *slot = updated;
        Ok(json!({ "user": projected }))
    }

    async fn delete(&self, variables: &Value) -> Result<Value, TransportError> {
        let id = variables.get("id").and_then(Value::as_str).ok_or_else(invalid)?;

        let mut users = self.users.write().await;
        let slot = users
            .iter_mut()
            .find(|user| {
                user.id.as_ref().map(ObjectId::as_str) == Some(id) && user.deleted != Some(true)
            })
            .ok_or_else(|| graphql_failure(200, &[USER_NOT_FOUND]))?;
        slot.deleted = Some(true);
        slot.deleted_at = Some(Nullable::Value(Utc::now()));
        Ok(json!({ "deleted": true }))
    }
}

impl GraphqlTransport for InMemoryAccountBackend {
    fn request(&self, query: &str, variables: Value) -> BoxFuture<'_, Result<Value, TransportError>> {
        self.record(query, &variables);
        let query = query.to_owned();
        Box::pin(async move { self.handle(&query, variables).await })
    }
}

fn invalid() -> TransportError {
    graphql_failure(400, &[ARGUMENT_VALIDATION_ERROR])
}

fn selection(query: &str) -> Result<FieldSelection, TransportError> {
    FieldSelection::from_document(query).map_err(|_| graphql_failure(400, &[GRAPHQL_VALIDATION_FAILED]))
}

fn object(value: Option<&Value>) -> Result<Map<String, Value>, TransportError> {
    value.and_then(Value::as_object).cloned().ok_or_else(invalid)
}

fn project(user: &User, selection: &FieldSelection) -> Value {
    encode_user(&user.project(selection.fields()))
}

/// Overlay mutation data onto a wire record; the password is never stored.
fn apply(record: &mut Map<String, Value>, data: Map<String, Value>) {
    for (key, value) in data {
        match key.as_str() {
            "password" => {},
            "updateLastLogin" => {
                if value == Value::Bool(true) {
                    record.insert("lastLogin".to_owned(), Value::String(format_date(&Utc::now())));
                }
            },
            _ => {
                record.insert(key, value);
            },
        }
    }
}
