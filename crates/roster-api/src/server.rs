// roster-api/src/server.rs
// ============================================================================
// Module: API Server
// Description: REST server for the user roster over axum.
// Purpose: Expose record store operations through the HTTP wire contract.
// Dependencies: roster-core, roster-config, axum, tokio
// ============================================================================

//! ## Overview
//! The API server exposes the user roster over REST. Request bodies are parsed
//! by hand from raw bytes so every 4xx response keeps the `{"error": ...}`
//! contract, store calls run through a blocking section, and every request
//! emits one audit event. Inputs are untrusted and validated before any store
//! access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use roster_config::AuditConfig;
use roster_config::RecordStoreType;
use roster_config::RosterConfig;
use roster_core::InMemoryRecordStore;
use roster_core::RecordId;
use roster_core::RecordStore;
use roster_core::SharedRecordStore;
use roster_core::StoreError;
use roster_core::UserDraft;
use roster_core::UserRecord;
use roster_store_sqlite::SqliteRecordStore;
use roster_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::audit::ApiAuditSink;
use crate::audit::ApiOutcome;
use crate::audit::ApiRequestEvent;
use crate::audit::ApiRequestEventParams;
use crate::audit::FileAuditSink;
use crate::audit::NullAuditSink;
use crate::audit::ServerStartedEvent;
use crate::audit::StderrAuditSink;

// ============================================================================
// SECTION: API Server
// ============================================================================

/// REST API server for the user roster.
pub struct ApiServer {
    /// Service configuration.
    config: RosterConfig,
    /// Shared record store backing the routes.
    store: SharedRecordStore,
    /// Audit sink for request events.
    audit: Arc<dyn ApiAuditSink>,
}

impl ApiServer {
    /// Builds a new API server from configuration.
    ///
    /// The record store is probed once so a broken backend fails at startup
    /// rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when initialization fails.
    pub fn from_config(config: RosterConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let store = build_record_store(&config)?;
        store.readiness().map_err(|err| ApiServerError::Init(err.to_string()))?;
        let audit = build_audit_sink(&config.audit)?;
        Ok(Self {
            config,
            store,
            audit,
        })
    }

    /// Serves requests on the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        let addr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| ApiServerError::Config(err.to_string()))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ApiServerError::Transport("http bind failed".to_string()))?;
        self.serve_with_listener(listener).await
    }

    /// Serves requests on a pre-bound listener.
    ///
    /// Callers that bind port 0 can read the local address from the listener
    /// before handing it over.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the server fails.
    pub async fn serve_with_listener(
        self,
        listener: tokio::net::TcpListener,
    ) -> Result<(), ApiServerError> {
        let bind = listener
            .local_addr()
            .map_err(|_| ApiServerError::Transport("http bind failed".to_string()))?;
        self.audit.record_server_started(&ServerStartedEvent::new(
            bind.to_string(),
            store_label(self.config.record_store.store_type),
        ));
        let state = Arc::new(ServerState {
            store: self.store,
            max_body_bytes: self.config.server.max_body_bytes,
            audit: self.audit,
        });
        axum::serve(listener, api_router(state))
            .await
            .map_err(|_| ApiServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the record store selected by configuration.
fn build_record_store(config: &RosterConfig) -> Result<SharedRecordStore, ApiServerError> {
    let store = match config.record_store.store_type {
        RecordStoreType::Memory => SharedRecordStore::from_store(InMemoryRecordStore::new()),
        RecordStoreType::Sqlite => {
            let path = config.record_store.path.clone().ok_or_else(|| {
                ApiServerError::Config("sqlite record_store requires path".to_string())
            })?;
            let sqlite_config = SqliteStoreConfig {
                path,
                busy_timeout_ms: config.record_store.busy_timeout_ms,
                journal_mode: config.record_store.journal_mode,
                sync_mode: config.record_store.sync_mode,
            };
            let store = SqliteRecordStore::new(&sqlite_config)
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            SharedRecordStore::from_store(store)
        }
    };
    Ok(store)
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn ApiAuditSink>, ApiServerError> {
    if !config.enabled {
        return Ok(Arc::new(NullAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => {
            let sink = FileAuditSink::new(std::path::Path::new(path))
                .map_err(|err| ApiServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Returns the audit label for a store backend.
const fn store_label(store_type: RecordStoreType) -> &'static str {
    match store_type {
        RecordStoreType::Memory => "memory",
        RecordStoreType::Sqlite => "sqlite",
    }
}

// ============================================================================
// SECTION: HTTP Routes
// ============================================================================

/// Shared server state for route handlers.
struct ServerState {
    /// Shared record store backing the routes.
    store: SharedRecordStore,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Audit sink for request events.
    audit: Arc<dyn ApiAuditSink>,
}

/// Framework-level body ceiling, above the largest configurable cap.
///
/// Config validation caps `max_body_bytes` at 16 MiB, so every request the
/// framework admits but the configured cap rejects receives the JSON 413
/// from `parse_draft` rather than the transport-level rejection.
const FRAMEWORK_BODY_CEILING: usize = 32 * 1024 * 1024;

/// Builds the axum router for the API.
fn api_router(state: Arc<ServerState>) -> Router {
    let body_limit = DefaultBodyLimit::max(FRAMEWORK_BODY_CEILING);
    Router::new()
        .route("/", get(handle_root))
        .route("/api/users", get(handle_list_users).post(handle_create_user))
        .route(
            "/api/users/{id}",
            get(handle_get_user).put(handle_update_user).delete(handle_delete_user),
        )
        .layer(body_limit)
        .with_state(state)
}

/// Handles `GET /` liveness requests.
async fn handle_root(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let started = Instant::now();
    let response = liveness_response();
    finish_request(&state, "GET", "/".to_string(), response, 0, started)
}

/// Handles `GET /api/users` requests.
async fn handle_list_users(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let started = Instant::now();
    let response = run_blocking(|| list_users_response(&state.store));
    finish_request(&state, "GET", "/api/users".to_string(), response, 0, started)
}

/// Handles `GET /api/users/{id}` requests.
async fn handle_get_user(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let started = Instant::now();
    let response = run_blocking(|| get_user_response(&state.store, &raw_id));
    finish_request(&state, "GET", format!("/api/users/{raw_id}"), response, 0, started)
}

/// Handles `POST /api/users` requests.
async fn handle_create_user(
    State(state): State<Arc<ServerState>>,
    bytes: Bytes,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_bytes = bytes.len();
    let response = run_blocking(|| create_user_response(&state, &bytes));
    finish_request(&state, "POST", "/api/users".to_string(), response, request_bytes, started)
}

/// Handles `PUT /api/users/{id}` requests.
async fn handle_update_user(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
    bytes: Bytes,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_bytes = bytes.len();
    let response = run_blocking(|| update_user_response(&state, &raw_id, &bytes));
    finish_request(&state, "PUT", format!("/api/users/{raw_id}"), response, request_bytes, started)
}

/// Handles `DELETE /api/users/{id}` requests.
async fn handle_delete_user(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let started = Instant::now();
    let response = run_blocking(|| delete_user_response(&state.store, &raw_id));
    finish_request(&state, "DELETE", format!("/api/users/{raw_id}"), response, 0, started)
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Response produced by a route before conversion for axum.
#[derive(Debug)]
struct ApiResponse {
    /// HTTP status code.
    status: StatusCode,
    /// JSON response body.
    body: Value,
    /// Normalized error kind label for audit events.
    error_kind: Option<&'static str>,
    /// Internal failure detail withheld from the response body.
    detail: Option<String>,
}

impl ApiResponse {
    /// Builds a success response.
    fn ok(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            error_kind: None,
            detail: None,
        }
    }

    /// Builds an error response with the wire-contract body shape.
    fn error(status: StatusCode, message: &str, kind: &'static str) -> Self {
        Self {
            status,
            body: error_body(message),
            error_kind: Some(kind),
            detail: None,
        }
    }

    /// Attaches internal failure detail for the audit log.
    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Partially-specified user fields from a request body.
#[derive(Debug, Deserialize)]
struct UserPayload {
    /// User display name.
    name: Option<String>,
    /// Unique email address.
    email: Option<String>,
    /// Age in whole years.
    age: Option<i64>,
}

impl UserPayload {
    /// Converts the payload into a draft, treating absent fields as empty.
    fn into_draft(self) -> UserDraft {
        UserDraft {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
        }
    }
}

/// Builds the response for `GET /`.
fn liveness_response() -> ApiResponse {
    ApiResponse::ok(StatusCode::OK, message_body("User roster API is running"))
}

/// Builds the response for `GET /api/users`.
fn list_users_response(store: &SharedRecordStore) -> ApiResponse {
    match store.list_all() {
        Ok(records) => match serde_json::to_value(&records) {
            Ok(body) => ApiResponse::ok(StatusCode::OK, body),
            Err(_) => ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch users",
                "serialization",
            ),
        },
        Err(err) => store_error_response(&err, "Failed to fetch users"),
    }
}

/// Builds the response for `GET /api/users/{id}`.
fn get_user_response(store: &SharedRecordStore, raw_id: &str) -> ApiResponse {
    let Some(id) = parse_record_id(raw_id) else {
        return not_found_response();
    };
    match store.get_by_id(id) {
        Ok(Some(record)) => record_response(StatusCode::OK, &record, "Failed to fetch user"),
        Ok(None) => not_found_response(),
        Err(err) => store_error_response(&err, "Failed to fetch user"),
    }
}

/// Builds the response for `POST /api/users`.
fn create_user_response(state: &ServerState, bytes: &Bytes) -> ApiResponse {
    let draft = match parse_draft(state.max_body_bytes, bytes) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match state.store.insert(&draft) {
        Ok(record) => record_response(StatusCode::CREATED, &record, "Failed to create user"),
        Err(err) => store_error_response(&err, "Failed to create user"),
    }
}

/// Builds the response for `PUT /api/users/{id}`.
///
/// Field validation runs before the id lookup, so a bad body with an absent
/// id still yields 400.
fn update_user_response(state: &ServerState, raw_id: &str, bytes: &Bytes) -> ApiResponse {
    let draft = match parse_draft(state.max_body_bytes, bytes) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    let Some(id) = parse_record_id(raw_id) else {
        return not_found_response();
    };
    match state.store.update(id, &draft) {
        Ok(true) => ApiResponse::ok(StatusCode::OK, updated_body(id)),
        Ok(false) => not_found_response(),
        Err(err) => store_error_response(&err, "Failed to update user"),
    }
}

/// Builds the response for `DELETE /api/users/{id}`.
fn delete_user_response(store: &SharedRecordStore, raw_id: &str) -> ApiResponse {
    let Some(id) = parse_record_id(raw_id) else {
        return not_found_response();
    };
    match store.delete_by_id(id) {
        Ok(true) => ApiResponse::ok(StatusCode::OK, message_body("User deleted successfully")),
        Ok(false) => not_found_response(),
        Err(err) => store_error_response(&err, "Failed to delete user"),
    }
}

/// Parses and validates a user draft from a request body.
fn parse_draft(max_body_bytes: usize, bytes: &Bytes) -> Result<UserDraft, ApiResponse> {
    if bytes.len() > max_body_bytes {
        return Err(ApiResponse::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
            "payload_too_large",
        ));
    }
    let payload: UserPayload = serde_json::from_slice(bytes.as_ref()).map_err(|_| {
        ApiResponse::error(StatusCode::BAD_REQUEST, "Invalid request body", "invalid_body")
    })?;
    let draft = payload.into_draft();
    if !draft.has_required_fields() {
        return Err(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "name, email and age are required",
            "validation",
        ));
    }
    Ok(draft)
}

/// Parses a path id, treating unparseable values as absent records.
fn parse_record_id(raw_id: &str) -> Option<RecordId> {
    raw_id.parse::<RecordId>().ok()
}

/// Builds the standard missing-record response.
fn not_found_response() -> ApiResponse {
    ApiResponse::error(StatusCode::NOT_FOUND, "User not found", "not_found")
}

/// Serializes a record body, falling back to the operation failure message.
fn record_response(
    status: StatusCode,
    record: &UserRecord,
    failure_message: &'static str,
) -> ApiResponse {
    match serde_json::to_value(record) {
        Ok(body) => ApiResponse::ok(status, body),
        Err(_) => ApiResponse::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            failure_message,
            "serialization",
        ),
    }
}

/// Maps a store failure onto the wire contract for one operation.
fn store_error_response(error: &StoreError, failure_message: &'static str) -> ApiResponse {
    if error.is_constraint() {
        return ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "Email already registered",
            "constraint",
        );
    }
    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, failure_message, "store")
        .with_detail(error.to_string())
}

/// Builds a `{"message": ...}` body.
fn message_body(message: &str) -> Value {
    let mut body = Map::new();
    body.insert("message".to_string(), Value::String(message.to_string()));
    Value::Object(body)
}

/// Builds an `{"error": ...}` body.
fn error_body(message: &str) -> Value {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::String(message.to_string()));
    Value::Object(body)
}

/// Builds the `{"message", "id"}` body for update confirmations.
fn updated_body(id: RecordId) -> Value {
    let mut body = Map::new();
    body.insert("message".to_string(), Value::String("User updated successfully".to_string()));
    body.insert("id".to_string(), Value::from(id.get()));
    Value::Object(body)
}

/// Runs a store operation, shifting to a blocking context when available.
fn run_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

/// Records the request audit event and shapes the axum response.
fn finish_request(
    state: &ServerState,
    method: &'static str,
    route: String,
    response: ApiResponse,
    request_bytes: usize,
    started: Instant,
) -> (StatusCode, Json<Value>) {
    let event = ApiRequestEvent::new(ApiRequestEventParams {
        method,
        route,
        status: response.status.as_u16(),
        outcome: ApiOutcome::from_status(response.status.as_u16()),
        error_kind: response.error_kind,
        detail: response.detail,
        request_bytes,
        duration_ms: started.elapsed().as_millis(),
    });
    state.audit.record_request(&event);
    (response.status, Json(response.body))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
