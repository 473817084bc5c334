//! Account operations: get, find, search, create, update, delete.
//!
//! Every operation validates its arguments before any request is sent,
//! issues at most one transport call, and decodes the result against the
//! requested projection.

use crate::call::call;
use crate::error::{AccountError, AccountResult, RequiredArguments};
use crate::projection::IntoSelection;
use crate::search::UserSearch;
use account_client_api::documents;
use account_client_api::schemas::{
    CREATE_USER_INPUT, GET_USER_ARGS, ID_INPUT, UPDATE_USER_INPUT, USER_FILTER, pagination_schema,
};
use account_client_api::{
    DELETE_USER, DecodeError, FieldSelection, IntoFieldBag, Operation, decode_page, decode_user,
};
use account_client_domain::{DEFAULT_PAGE_LIMIT, Page, User};
use account_client_ports::{GraphqlTransport, LogFields, LoggerPort, log_fields};
use account_client_shared::{ErrorEnvelope, FieldBag, Schema};
use serde_json::{Value, json};
use std::sync::Arc;

const LOOKUP_KEYS: [&str; 3] = ["id", "email", "username"];
const CREATE_REQUIRED: [&str; 5] = ["email", "firstName", "lastName", "role", "password"];

/// Client for the remote account service.
///
/// Cheap to clone; clones share the transport and logger.
#[derive(Clone)]
pub struct AccountService {
    transport: Arc<dyn GraphqlTransport>,
    logger: Option<Arc<dyn LoggerPort>>,
    pagination: Arc<Schema>,
}

impl AccountService {
    /// Service over `transport` with the default page size.
    #[must_use]
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self {
            transport,
            logger: None,
            pagination: Arc::new(pagination_schema(DEFAULT_PAGE_LIMIT)),
        }
    }

    /// Attach a logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Page size used when a pagination request leaves `limit` out.
    ///
    /// The value is validated like a caller-supplied limit.
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.pagination = Arc::new(pagination_schema(limit));
        self
    }

    /// Fetch one user by id, email or username.
    ///
    /// Returns `Ok(None)` when the service reports no such user.
    pub async fn get(
        &self,
        by: impl IntoFieldBag,
        fields: impl IntoSelection,
    ) -> AccountResult<Option<User>> {
        let by = by.into_field_bag();
        self.debug("account.get.start", "get user", log_fields([("by", by.clone().into_value())]));
        let result = self.run_get(by, fields).await;
        self.observe("get", result)
    }

    /// Fetch one page of users matching `filter`.
    pub async fn find(
        &self,
        filter: impl IntoFieldBag,
        fields: impl IntoSelection,
        pagination: impl IntoFieldBag,
    ) -> AccountResult<Page<User>> {
        let filter = filter.into_field_bag();
        let pagination = pagination.into_field_bag();
        self.debug(
            "account.find.start",
            "find users",
            log_fields([
                ("filters", filter.clone().into_value()),
                ("pagination", pagination.clone().into_value()),
            ]),
        );
        let result = self.find_page(filter, fields, pagination).await;
        self.observe("find", result)
    }

    /// Walk every page matching `filter`, one request per page.
    ///
    /// Arguments are validated up front; nothing is requested until the
    /// first page is pulled.
    pub fn search(
        &self,
        filter: impl IntoFieldBag,
        fields: impl IntoSelection,
        pagination: impl IntoFieldBag,
    ) -> AccountResult<UserSearch> {
        let filter = filter.into_field_bag();
        let pagination = pagination.into_field_bag();
        self.debug(
            "account.search.start",
            "search users",
            log_fields([
                ("filters", filter.clone().into_value()),
                ("pagination", pagination.clone().into_value()),
            ]),
        );
        let result = self.prepare_search(filter, fields, pagination);
        self.observe("search", result)
    }

    /// Create a user and return the requested fields of the new record.
    pub async fn create(
        &self,
        data: impl IntoFieldBag,
        fields: impl IntoSelection,
    ) -> AccountResult<User> {
        let data = data.into_field_bag();
        self.debug("account.create.start", "create user", log_fields([("data", data.clone().into_value())]));
        let result = self.run_create(data, fields).await;
        self.observe("create", result)
    }

    /// Update the set fields of user `id`.
    pub async fn update(
        &self,
        id: impl Into<String>,
        data: impl IntoFieldBag,
        fields: impl IntoSelection,
    ) -> AccountResult<User> {
        let id = id.into();
        let data = data.into_field_bag();
        self.debug(
            "account.update.start",
            "update user",
            log_fields([("id", json!(id)), ("data", data.clone().into_value())]),
        );
        let result = self.run_update(id, data, fields).await;
        self.observe("update", result)
    }

    /// Delete user `id`.
    pub async fn delete(&self, id: impl Into<String>) -> AccountResult<()> {
        let id = id.into();
        self.debug("account.delete.start", "delete user", log_fields([("id", json!(id))]));
        let result = self.run_delete(id).await;
        self.observe("delete", result)
    }

    async fn run_get(&self, by: FieldBag, fields: impl IntoSelection) -> AccountResult<Option<User>> {
        let given = LOOKUP_KEYS.iter().any(|key| {
            by.get(key)
                .is_some_and(|value| !value.is_null() && value.as_str() != Some(""))
        });
        if !given {
            return Err(AccountError::ArgumentRequired(RequiredArguments::OneOf(
                LOOKUP_KEYS.to_vec(),
            )));
        }

        let args = GET_USER_ARGS.validate(by)?;
        let selection = fields.into_selection()?;

        let data = self
            .execute(
                Operation::GetUser,
                &documents::get_user(&selection),
                args.into_inner().into_value(),
            )
            .await?;

        match data.get(Operation::GetUser.result_key()) {
            None => Err(AccountError::UnexpectedResponse),
            Some(Value::Null) => Ok(None),
            Some(user) => self.decoded(Operation::GetUser, decode_user(user, &selection)).map(Some),
        }
    }

    pub(crate) async fn find_page(
        &self,
        filter: FieldBag,
        fields: impl IntoSelection,
        pagination: FieldBag,
    ) -> AccountResult<Page<User>> {
        let filters = USER_FILTER.validate(filter)?;
        let pagination = self.pagination.validate(pagination)?;
        let selection = fields.into_selection()?;

        let variables = json!({
            "filters": filters.into_inner().into_value(),
            "pagination": pagination.into_inner().into_value(),
        });
        let data = self
            .execute(Operation::FindUsers, &documents::find_users(&selection), variables)
            .await?;

        match data.get(Operation::FindUsers.result_key()) {
            None | Some(Value::Null) => Err(AccountError::UnexpectedResponse),
            Some(result) => self.decoded(Operation::FindUsers, decode_page(result, &selection)),
        }
    }

    fn prepare_search(
        &self,
        filter: FieldBag,
        fields: impl IntoSelection,
        pagination: FieldBag,
    ) -> AccountResult<UserSearch> {
        USER_FILTER.check(&filter)?;
        self.pagination.validate(pagination.clone())?;
        let selection = fields.into_selection()?;
        Ok(UserSearch::new(self.clone(), filter, selection, pagination))
    }

    async fn run_create(&self, data: FieldBag, fields: impl IntoSelection) -> AccountResult<User> {
        let missing: Vec<&'static str> = CREATE_REQUIRED
            .into_iter()
            .filter(|key| data.get(key).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(AccountError::ArgumentRequired(RequiredArguments::All(missing)));
        }

        let data = CREATE_USER_INPUT.validate(data)?;
        let selection = fields.into_selection()?;

        let data = self
            .execute(
                Operation::CreateUser,
                &documents::create_user(&selection),
                json!({ "data": data.into_inner().into_value() }),
            )
            .await?;
        self.returned_user(Operation::CreateUser, &data, &selection)
    }

    async fn run_update(
        &self,
        id: String,
        data: FieldBag,
        fields: impl IntoSelection,
    ) -> AccountResult<User> {
        ID_INPUT.validate(FieldBag::new().with("id", id.clone()))?;
        let data = UPDATE_USER_INPUT.validate(data)?;
        let selection = fields.into_selection()?;

        let data = self
            .execute(
                Operation::UpdateUser,
                &documents::update_user(&selection),
                json!({ "id": id, "data": data.into_inner().into_value() }),
            )
            .await?;
        self.returned_user(Operation::UpdateUser, &data, &selection)
    }

    async fn run_delete(&self, id: String) -> AccountResult<()> {
        ID_INPUT.validate(FieldBag::new().with("id", id.clone()))?;

        let data = self
            .execute(Operation::DeleteUser, DELETE_USER, json!({ "id": id }))
            .await?;
        if data.get(Operation::DeleteUser.result_key()) != Some(&Value::Bool(true)) {
            return Err(AccountError::UnexpectedResponse);
        }
        Ok(())
    }

    /// Send one document and return `data` once no GraphQL error was reported.
    async fn execute(&self, operation: Operation, query: &str, variables: Value) -> AccountResult<Value> {
        self.debug(
            "account.call.start",
            "sending request",
            log_fields([
                ("operation", json!(operation.name())),
                ("query", json!(query)),
                ("variables", variables.clone()),
            ]),
        );

        let response = call(self.transport.as_ref(), query, variables).await?;
        self.debug(
            "account.call.response",
            "received response",
            log_fields([
                ("operation", json!(operation.name())),
                ("status", json!(response.status)),
                ("errors", json!(response.errors.len())),
            ]),
        );

        response.raise()?;
        Ok(response.into_data().unwrap_or(Value::Null))
    }

    fn returned_user(
        &self,
        operation: Operation,
        data: &Value,
        selection: &FieldSelection,
    ) -> AccountResult<User> {
        match data.get(operation.result_key()) {
            None | Some(Value::Null) => Err(AccountError::UnexpectedResponse),
            Some(user) => self.decoded(operation, decode_user(user, selection)),
        }
    }

    fn decoded<T>(&self, operation: Operation, decoded: Result<T, DecodeError>) -> AccountResult<T> {
        decoded.map_err(|error| {
            self.debug(
                "account.decode.failed",
                &error.to_string(),
                log_fields([("operation", json!(operation.name()))]),
            );
            AccountError::from(error)
        })
    }

    fn debug(&self, event: &str, message: &str, fields: LogFields) {
        if let Some(logger) = self.logger.as_ref() {
            logger.debug(event, message, Some(fields));
        }
    }

    fn observe<T>(&self, operation: &str, result: AccountResult<T>) -> AccountResult<T> {
        let Some(logger) = self.logger.as_ref() else {
            return result;
        };
        let fields = log_fields([("operation", json!(operation))]);
        match result.as_ref() {
            Ok(_) => logger.debug(&format!("account.{operation}.done"), "operation completed", Some(fields)),
            Err(error) => logger.failure(
                &format!("account.{operation}.failed"),
                &ErrorEnvelope::from(error.clone()),
                Some(fields),
            ),
        }
        result
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccountService")
            .field("logger", &self.logger.is_some())
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}
