// crates/roster-core/src/core/mod.rs
// ============================================================================
// Module: Roster Core Types
// Description: Canonical user record, identifier, and time structures.
// Purpose: Provide stable, serializable types shared by stores, server, and clients.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define the user record data model. These types are the canonical
//! source of truth for the REST wire contract and every store backend.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ParseRecordIdError;
pub use identifiers::RecordId;
pub use record::UserDraft;
pub use record::UserRecord;
pub use time::Timestamp;
