// roster-api/src/audit.rs
// ============================================================================
// Module: API Audit Logging
// Description: Structured audit events for REST request handling.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for API request logging.
//! It is intentionally lightweight so deployments can route events to their
//! preferred logging pipeline without redesign. Store failure detail is
//! recorded here and never leaked into response bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// The request succeeded (2xx).
    Ok,
    /// The request was rejected at the wire contract (4xx).
    ClientError,
    /// The request failed inside the server (5xx).
    ServerError,
}

impl ApiOutcome {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 ..= 499 => Self::ClientError,
            500 ..= 599 => Self::ServerError,
            _ => Self::Ok,
        }
    }
}

/// API request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: &'static str,
    /// Request route with path parameters filled in.
    pub route: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Request outcome classification.
    pub outcome: ApiOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal failure detail withheld from response bodies.
    pub detail: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Handler duration in milliseconds.
    pub duration_ms: u128,
}

/// Server startup audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStartedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Local bind address.
    pub bind: String,
    /// Record store backend label.
    pub store: &'static str,
}

/// Inputs required to construct a request audit event.
pub struct ApiRequestEventParams {
    /// HTTP method.
    pub method: &'static str,
    /// Request route with path parameters filled in.
    pub route: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Request outcome classification.
    pub outcome: ApiOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal failure detail withheld from response bodies.
    pub detail: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Handler duration in milliseconds.
    pub duration_ms: u128,
}

impl ApiRequestEvent {
    /// Creates a new request audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiRequestEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "api_request",
            timestamp_ms,
            method: params.method,
            route: params.route,
            status: params.status,
            outcome: params.outcome,
            error_kind: params.error_kind,
            detail: params.detail,
            request_bytes: params.request_bytes,
            duration_ms: params.duration_ms,
        }
    }
}

impl ServerStartedEvent {
    /// Creates a new startup audit event with a consistent timestamp.
    #[must_use]
    pub fn new(bind: String, store: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "server_started",
            timestamp_ms,
            bind,
            store,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for API request events.
pub trait ApiAuditSink: Send + Sync {
    /// Record a request audit event.
    fn record_request(&self, event: &ApiRequestEvent);

    /// Record a server startup event.
    fn record_server_started(&self, _event: &ServerStartedEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ApiAuditSink for StderrAuditSink {
    fn record_request(&self, event: &ApiRequestEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_server_started(&self, event: &ServerStartedEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ApiAuditSink for FileAuditSink {
    fn record_request(&self, event: &ApiRequestEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }

    fn record_server_started(&self, event: &ServerStartedEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NullAuditSink;

impl ApiAuditSink for NullAuditSink {
    fn record_request(&self, _event: &ApiRequestEvent) {}

    fn record_server_started(&self, _event: &ServerStartedEvent) {}
}
