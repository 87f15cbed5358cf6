// crates/roster-client/src/gateway.rs
// ============================================================================
// Module: Record Gateway
// Description: HTTP client for the roster REST wire contract.
// Purpose: Provide remote record operations behind a trait seam.
// Dependencies: reqwest, url, serde, roster-core
// ============================================================================

//! ## Overview
//! The record gateway is the client side of the wire contract: five remote
//! operations behind [`RecordGateway`] so view code never touches HTTP
//! directly. Server responses are untrusted; bodies are size-limited and
//! parsing failures fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use roster_core::RecordId;
use roster_core::UserDraft;
use roster_core::UserRecord;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum API response body size accepted by the gateway.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// SECTION: Types
// ============================================================================

/// HTTP gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base endpoint URL for the API server.
    pub endpoint: String,
    /// Request timeout covering the full exchange.
    pub timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl GatewayConfig {
    /// Creates a configuration with default timeouts for an endpoint.
    #[must_use]
    pub fn for_endpoint(endpoint: String) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Record gateway errors.
///
/// # Invariants
/// - Variants are stable for view error mapping and tests.
/// - String payloads are user-facing and may include untrusted server text.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("gateway config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("gateway transport error: {0}")]
    Transport(String),
    /// The server rejected the request with a wire-contract error body.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided or synthesized message.
        message: String,
    },
    /// JSON decoding error on a success response.
    #[error("gateway json error: {0}")]
    Json(String),
}

impl GatewayError {
    /// Returns the message to surface in view state.
    ///
    /// Server-provided messages pass through verbatim; other failures use
    /// the full error description.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                message, ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Confirmation payload returned by the update route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReceipt {
    /// Human-readable confirmation message.
    pub message: String,
    /// Identifier of the updated record.
    pub id: RecordId,
}

/// Confirmation payload returned by the delete route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReceipt {
    /// Human-readable confirmation message.
    pub message: String,
}

// ============================================================================
// SECTION: Gateway Trait
// ============================================================================

/// Remote record operations exposed by the roster API.
///
/// The view controller is generic over this trait so tests can drive it with
/// an in-process fake.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Fetches the full record list, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the request or decoding fails.
    async fn list(&self) -> Result<Vec<UserRecord>, GatewayError>;

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the record is absent or the request
    /// fails.
    async fn get(&self, id: RecordId) -> Result<UserRecord, GatewayError>;

    /// Creates a record and returns the persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the server rejects the draft or the
    /// request fails.
    async fn create(&self, draft: &UserDraft) -> Result<UserRecord, GatewayError>;

    /// Updates the client-editable fields of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the record is absent, the server rejects
    /// the draft, or the request fails.
    async fn update(&self, id: RecordId, draft: &UserDraft)
    -> Result<UpdateReceipt, GatewayError>;

    /// Deletes a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the record is absent or the request
    /// fails.
    async fn delete(&self, id: RecordId) -> Result<DeleteReceipt, GatewayError>;
}

// ============================================================================
// SECTION: HTTP Gateway
// ============================================================================

/// HTTP implementation of [`RecordGateway`] over the REST wire contract.
pub struct HttpRecordGateway {
    /// Reqwest client instance.
    client: Client,
    /// Validated base endpoint.
    endpoint: Url,
}

impl HttpRecordGateway {
    /// Builds a new HTTP gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the endpoint is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(config.endpoint.trim())
            .map_err(|err| GatewayError::Config(format!("invalid endpoint: {err}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(GatewayError::Config("endpoint cannot be a base url".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
        })
    }

    /// Builds a route URL under the base endpoint.
    fn route_url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.endpoint.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| GatewayError::Config("endpoint cannot be a base url".to_string()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    /// Issues a request and decodes the body against the wire contract.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response =
            request.send().await.map_err(|err| GatewayError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, MAX_RESPONSE_BYTES).await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| GatewayError::Json(format!("invalid response payload: {err}")))
    }
}

#[async_trait]
impl RecordGateway for HttpRecordGateway {
    async fn list(&self) -> Result<Vec<UserRecord>, GatewayError> {
        let url = self.route_url(&["api", "users"])?;
        self.execute(self.client.get(url)).await
    }

    async fn get(&self, id: RecordId) -> Result<UserRecord, GatewayError> {
        let url = self.route_url(&["api", "users", &id.to_string()])?;
        self.execute(self.client.get(url)).await
    }

    async fn create(&self, draft: &UserDraft) -> Result<UserRecord, GatewayError> {
        let url = self.route_url(&["api", "users"])?;
        self.execute(self.client.post(url).json(draft)).await
    }

    async fn update(
        &self,
        id: RecordId,
        draft: &UserDraft,
    ) -> Result<UpdateReceipt, GatewayError> {
        let url = self.route_url(&["api", "users", &id.to_string()])?;
        self.execute(self.client.put(url).json(draft)).await
    }

    async fn delete(&self, id: RecordId) -> Result<DeleteReceipt, GatewayError> {
        let url = self.route_url(&["api", "users", &id.to_string()])?;
        self.execute(self.client.delete(url)).await
    }
}

// ============================================================================
// SECTION: HTTP Helpers
// ============================================================================

/// Error body shape returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Human-readable error message.
    error: String,
}

/// Maps a non-success response onto the error taxonomy.
fn api_error(status: u16, body: &[u8]) -> GatewayError {
    let message = serde_json::from_slice::<ErrorBody>(body).map_or_else(
        |_| format!("request failed with status {status}"),
        |parsed| parsed.error,
    );
    GatewayError::Api {
        status,
        message,
    }
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, GatewayError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| GatewayError::Transport(err.to_string()))?
    {
        let next_total = total.checked_add(chunk.len()).ok_or_else(|| {
            GatewayError::Transport(format!("response exceeds size limit ({limit})"))
        })?;
        if next_total > limit {
            return Err(GatewayError::Transport(format!(
                "response exceeds size limit ({next_total} > {limit})"
            )));
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
