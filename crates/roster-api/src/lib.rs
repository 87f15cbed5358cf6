// roster-api/src/lib.rs
// ============================================================================
// Module: Roster API
// Description: REST API server and audit logging for the user roster.
// Purpose: Serve record store operations over the HTTP wire contract.
// Dependencies: roster-core, roster-config, axum, tokio
// ============================================================================

//! ## Overview
//! Roster API exposes the record store through a small REST surface. All
//! handlers go through [`server::ApiServer`], and every request emits one
//! structured audit event through [`audit::ApiAuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditSink;
pub use audit::ApiOutcome;
pub use audit::ApiRequestEvent;
pub use audit::ApiRequestEventParams;
pub use audit::FileAuditSink;
pub use audit::NullAuditSink;
pub use audit::ServerStartedEvent;
pub use audit::StderrAuditSink;
pub use server::ApiServer;
pub use server::ApiServerError;
