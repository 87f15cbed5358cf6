// crates/roster-core/src/core/identifiers.rs
// ============================================================================
// Module: Roster Identifiers
// Description: Strongly typed identifier for persisted user records.
// Purpose: Prevent identifier mixups and encode identity presence in the type system.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Persisted records always carry a [`RecordId`]; drafts carry none. Code that
//! holds a `UserRecord` therefore holds a valid identity by construction, and
//! "record without an id" is unrepresentable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroI64;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Record Identifier
// ============================================================================

/// Identifier of a persisted user record.
///
/// # Invariants
/// - Always >= 1 (store-assigned, 1-based, never reused within a store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(NonZeroI64);

impl RecordId {
    /// Creates a new record identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroI64) -> Self {
        Self(id)
    }

    /// Creates a record identifier from a raw value (returns `None` unless >= 1).
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw < 1 {
            return None;
        }
        NonZeroI64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Parse failure for textual record identifiers.
///
/// # Invariants
/// - Carries no input fragment; callers decide how much of the raw text to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRecordIdError;

impl fmt::Display for ParseRecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("record id must be a positive integer")
    }
}

impl std::error::Error for ParseRecordIdError {}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse().map_err(|_| ParseRecordIdError)?;
        Self::from_raw(raw).ok_or(ParseRecordIdError)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
