// crates/roster-core/src/interfaces/mod.rs
// ============================================================================
// Module: Roster Interfaces
// Description: Backend-agnostic record store contract.
// Purpose: Define the storage surface the API server and tools depend on.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The record store interface decouples the REST layer from any concrete
//! storage engine. Implementations must fail closed on corrupt or
//! version-incompatible data and must keep identifier assignment monotonic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::RecordId;
use crate::core::UserDraft;
use crate::core::UserRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors surfaced by record store implementations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - [`StoreError::Constraint`] is reserved for uniqueness violations and is
///   the only variant callers may map to a client error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("record store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("record store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("record store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("record store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint was violated.
    #[error("record store constraint violation: {0}")]
    Constraint(String),
    /// Store reported an error.
    #[error("record store error: {0}")]
    Store(String),
}

impl StoreError {
    /// Returns whether this error is a uniqueness constraint violation.
    #[must_use]
    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

// ============================================================================
// SECTION: Record Store
// ============================================================================

/// Record store for user persistence.
pub trait RecordStore {
    /// Inserts a draft and returns the persisted record.
    ///
    /// The store assigns the identifier and creation timestamp. Identifiers
    /// start at 1, grow strictly, and are never reused after deletion.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] when the email is already taken and
    /// other [`StoreError`] variants when persistence fails.
    fn insert(&self, draft: &UserDraft) -> Result<UserRecord, StoreError>;

    /// Lists all records, newest first.
    ///
    /// Ordering is creation time descending with identifier descending as the
    /// tie-break, so same-instant inserts stay deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Loads a single record by identifier.
    ///
    /// Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_by_id(&self, id: RecordId) -> Result<Option<UserRecord>, StoreError>;

    /// Overwrites the draft fields of an existing record.
    ///
    /// The identifier and creation timestamp are untouched. Returns whether a
    /// record with that identifier existed; updating an absent record is
    /// `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] when the new email collides with
    /// another record and other [`StoreError`] variants when persistence
    /// fails.
    fn update(&self, id: RecordId, draft: &UserDraft) -> Result<bool, StoreError>;

    /// Deletes a record by identifier.
    ///
    /// Returns whether a record was removed; deleting an absent record is
    /// `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_by_id(&self, id: RecordId) -> Result<bool, StoreError>;

    /// Reports store readiness for startup and health probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
