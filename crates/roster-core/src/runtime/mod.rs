// crates/roster-core/src/runtime/mod.rs
// ============================================================================
// Module: Roster Runtime
// Description: Concrete store implementations shipped with the core crate.
// Purpose: Provide the in-memory backend and the shared store wrapper.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the store implementations that need no external
//! engine: the in-memory backend and the `Arc`-based wrapper hosts use to
//! inject a store into the API server.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::InMemoryRecordStore;
pub use store::SharedRecordStore;
