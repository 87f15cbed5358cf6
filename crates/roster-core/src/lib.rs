// crates/roster-core/src/lib.rs
// ============================================================================
// Module: Roster Core Library
// Description: Public API surface for the Roster core.
// Purpose: Expose record types, the store interface, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Roster core provides the user record data model, the backend-agnostic
//! record store contract, and an in-memory store for tests and local runs.
//! It is backend-agnostic and integrates through explicit interfaces rather
//! than embedding into any HTTP framework.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::RecordStore;
pub use interfaces::StoreError;
pub use runtime::InMemoryRecordStore;
pub use runtime::SharedRecordStore;
