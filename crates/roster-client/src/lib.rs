// crates/roster-client/src/lib.rs
// ============================================================================
// Module: Roster Client Library
// Description: HTTP gateway and view controller for the roster API.
// Purpose: Expose the client surface consumed by the CLI console.
// Dependencies: roster-core, reqwest, url, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate is the client half of the roster system. [`gateway`] speaks the
//! wire contract over HTTP and maps failures into [`GatewayError`];
//! [`controller`] layers the view state machine on top of any
//! [`RecordGateway`] implementation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod controller;
pub mod gateway;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use controller::DeletePrompt;
pub use controller::FormState;
pub use controller::Phase;
pub use controller::ViewController;
pub use controller::ViewState;
pub use gateway::DeleteReceipt;
pub use gateway::GatewayConfig;
pub use gateway::GatewayError;
pub use gateway::HttpRecordGateway;
pub use gateway::MAX_RESPONSE_BYTES;
pub use gateway::RecordGateway;
pub use gateway::UpdateReceipt;
