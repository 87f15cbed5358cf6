// crates/roster-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Durable RecordStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for Roster user records.
// Dependencies: roster-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`roster_core::RecordStore`]
//! implementation. Identifier assignment lives in the database
//! (`AUTOINCREMENT`), email uniqueness is a table constraint, and schema
//! version mismatches fail closed at open time. Storage inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
