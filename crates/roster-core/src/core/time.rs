// crates/roster-core/src/core/time.rs
// ============================================================================
// Module: Roster Time Model
// Description: Creation timestamp representation for user records.
// Purpose: Provide an ordered, wire-stable time value assigned by stores.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Creation timestamps are assigned by the record store at insert time and are
//! never client-supplied. On the wire they are plain unix-epoch milliseconds,
//! so [`Timestamp`] serializes transparently as an integer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Creation timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Assigned by stores at insert time; immutable for the life of the record.
/// - Ordering follows wall-clock order for values produced by one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time.
    ///
    /// Pre-epoch clocks saturate to zero rather than failing.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(millis)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
