// crates/roster-core/src/runtime/store.rs
// ============================================================================
// Module: Roster In-Memory Store
// Description: Simple in-memory record store for tests and local runs.
// Purpose: Provide a record store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`RecordStore`]
//! for tests and local demos. It enforces the same identifier and uniqueness
//! rules as the durable backend so callers cannot observe a difference.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::RecordId;
use crate::core::Timestamp;
use crate::core::UserDraft;
use crate::core::UserRecord;
use crate::interfaces::RecordStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable state behind the in-memory store mutex.
#[derive(Debug)]
struct InMemoryState {
    /// Records keyed by identifier.
    records: BTreeMap<RecordId, UserRecord>,
    /// Next identifier to assign; grows monotonically, never reused.
    next_id: i64,
}

impl InMemoryState {
    /// Returns whether any record other than `exclude` already uses `email`.
    fn email_taken(&self, email: &str, exclude: Option<RecordId>) -> bool {
        self.records
            .values()
            .any(|record| Some(record.id) != exclude && record.email == email)
    }
}

/// In-memory record store for tests and local demos.
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Creates a new, empty in-memory record store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                records: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Locks the store state, normalizing mutex poisoning into a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, draft: &UserDraft) -> Result<UserRecord, StoreError> {
        let mut guard = self.lock()?;
        if guard.email_taken(&draft.email, None) {
            return Err(StoreError::Constraint(format!(
                "email already registered: {}",
                draft.email
            )));
        }
        let id = RecordId::from_raw(guard.next_id)
            .ok_or_else(|| StoreError::Store("record id counter exhausted".to_string()))?;
        guard.next_id = guard
            .next_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("record id counter exhausted".to_string()))?;
        let record = UserRecord {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            age: draft.age,
            created_at: Timestamp::now(),
        };
        guard.records.insert(id, record.clone());
        drop(guard);
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let guard = self.lock()?;
        let mut records: Vec<UserRecord> = guard.records.values().cloned().collect();
        drop(guard);
        records.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    fn get_by_id(&self, id: RecordId) -> Result<Option<UserRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.get(&id).cloned())
    }

    fn update(&self, id: RecordId, draft: &UserDraft) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        if !guard.records.contains_key(&id) {
            return Ok(false);
        }
        if guard.email_taken(&draft.email, Some(id)) {
            return Err(StoreError::Constraint(format!(
                "email already registered: {}",
                draft.email
            )));
        }
        if let Some(record) = guard.records.get_mut(&id) {
            record.name = draft.name.clone();
            record.email = draft.email.clone();
            record.age = draft.age;
        }
        drop(guard);
        Ok(true)
    }

    fn delete_by_id(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        Ok(guard.records.remove(&id).is_some())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared record store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedRecordStore {
    /// Inner store implementation.
    inner: Arc<dyn RecordStore + Send + Sync>,
}

impl SharedRecordStore {
    /// Wraps a record store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl RecordStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn RecordStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl RecordStore for SharedRecordStore {
    fn insert(&self, draft: &UserDraft) -> Result<UserRecord, StoreError> {
        self.inner.insert(draft)
    }

    fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.list_all()
    }

    fn get_by_id(&self, id: RecordId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.get_by_id(id)
    }

    fn update(&self, id: RecordId, draft: &UserDraft) -> Result<bool, StoreError> {
        self.inner.update(id, draft)
    }

    fn delete_by_id(&self, id: RecordId) -> Result<bool, StoreError> {
        self.inner.delete_by_id(id)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}
