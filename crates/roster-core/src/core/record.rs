// crates/roster-core/src/core/record.rs
// ============================================================================
// Module: Roster Record Types
// Description: Canonical user record and client-supplied draft structures.
// Purpose: Provide the wire-stable data model shared by server and clients.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A [`UserDraft`] is the client-supplied portion of a record: name, email,
//! and age. A [`UserRecord`] is what a store hands back: the same fields plus
//! the store-assigned identity and creation timestamp. Drafts have no id
//! field, so unsaved and persisted data cannot be confused.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RecordId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Draft
// ============================================================================

/// Client-supplied fields of a user record.
///
/// # Invariants
/// - Carries no identity and no timestamps; those are store-assigned.
/// - Field presence rules are enforced at the API boundary, not by stores.
/// - The default draft is empty and fails [`UserDraft::has_required_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// Contact email, unique across live records.
    pub email: String,
    /// Age in years.
    pub age: i64,
}

impl UserDraft {
    /// Returns whether all required fields carry usable values.
    ///
    /// Mirrors the API's acceptance rule: empty `name` or `email` and a zero
    /// `age` count as missing.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && self.age != 0
    }
}

// ============================================================================
// SECTION: Record
// ============================================================================

/// Persisted user record as returned by stores and the REST API.
///
/// # Invariants
/// - `id` and `created_at` are store-assigned and never change across updates.
/// - Serialized form uses the wire field name `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned identity.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Contact email, unique across live records.
    pub email: String,
    /// Age in years.
    pub age: i64,
    /// Creation timestamp assigned at insert.
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
}

impl UserRecord {
    /// Returns the client-editable fields of this record as a draft.
    #[must_use]
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
