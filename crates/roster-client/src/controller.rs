// crates/roster-client/src/controller.rs
// ============================================================================
// Module: View Controller
// Description: Client-side state machine for the roster view.
// Purpose: Keep list, form, and error state consistent across operations.
// Dependencies: roster-core, crate::gateway
// ============================================================================

//! ## Overview
//! The view controller owns the authoritative client-side copy of the record
//! list plus transient view state. Every mutation re-fetches the full list
//! from the server; the controller never patches `records` locally. Methods
//! take `&mut self`, so two mutations can never interleave.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roster_core::RecordId;
use roster_core::UserDraft;
use roster_core::UserRecord;

use crate::gateway::GatewayError;
use crate::gateway::RecordGateway;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Local validation message, matching the server's wire text.
const REQUIRED_FIELDS_MESSAGE: &str = "name, email and age are required";

/// Missing-record message, matching the server's wire text.
const MISSING_RECORD_MESSAGE: &str = "User not found";

// ============================================================================
// SECTION: View State
// ============================================================================

/// Client-side view state for the roster.
///
/// # Invariants
/// - `records` only changes on a successful list fetch; failures leave the
///   previous (stale) list visible.
/// - `error` carries the last operation's user-facing message and is cleared
///   when the next operation starts.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Last successfully fetched record list, newest first.
    pub records: Vec<UserRecord>,
    /// Form state machine.
    pub form: FormState,
    /// Refresh activity state.
    pub phase: Phase,
    /// Last operation's user-facing error.
    pub error: Option<String>,
}

/// Form visibility and target state.
///
/// # Invariants
/// - Editing always carries its target record; a form open without a target
///   cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// No form is open.
    #[default]
    Hidden,
    /// Creation form with a working draft.
    Creating {
        /// Draft under edit.
        draft: UserDraft,
    },
    /// Edit form bound to an existing record.
    Editing {
        /// Record being edited.
        target: UserRecord,
        /// Draft under edit.
        draft: UserDraft,
    },
}

/// Refresh activity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No refresh in flight.
    #[default]
    Idle,
    /// A list refresh is in flight.
    Loading,
}

/// Confirmation hook for destructive operations.
pub trait DeletePrompt {
    /// Returns whether the user confirmed deleting the record.
    fn confirm_delete(&self, record: &UserRecord) -> bool;
}

// ============================================================================
// SECTION: View Controller
// ============================================================================

/// View controller driving a [`RecordGateway`].
///
/// # Invariants
/// - All operations take `&mut self`; a second mutation cannot start until
///   the first completes.
pub struct ViewController<G> {
    /// Gateway used for all remote operations.
    gateway: G,
    /// Authoritative view state.
    state: ViewState,
}

impl<G: RecordGateway> ViewController<G> {
    /// Creates a controller with an empty view over the gateway.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: ViewState::default(),
        }
    }

    /// Returns the current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Fetches the record list, keeping the previous list on failure.
    pub async fn refresh(&mut self) {
        self.state.error = None;
        self.state.phase = Phase::Loading;
        match self.gateway.list().await {
            Ok(records) => self.state.records = records,
            Err(err) => self.state.error = Some(err.user_message()),
        }
        self.state.phase = Phase::Idle;
    }

    /// Opens the creation form with an empty draft.
    ///
    /// Any prior form state is replaced; switching from edit to create drops
    /// the edit target.
    pub fn begin_create(&mut self) {
        self.state.error = None;
        self.state.form = FormState::Creating {
            draft: UserDraft::default(),
        };
    }

    /// Opens the edit form for a record in the current list.
    ///
    /// An id not present in `records` is a no-op with an error message.
    pub fn begin_edit(&mut self, id: RecordId) {
        self.state.error = None;
        let Some(target) = self.find_record(id) else {
            self.state.error = Some(MISSING_RECORD_MESSAGE.to_string());
            return;
        };
        let draft = target.to_draft();
        self.state.form = FormState::Editing {
            target,
            draft,
        };
    }

    /// Closes the open form without submitting.
    pub fn cancel_form(&mut self) {
        self.state.error = None;
        self.state.form = FormState::Hidden;
    }

    /// Replaces the draft in the open form.
    pub fn set_draft(&mut self, draft: UserDraft) {
        match &mut self.state.form {
            FormState::Hidden => {
                self.state.error = Some("no form is open".to_string());
            }
            FormState::Creating {
                draft: current,
            }
            | FormState::Editing {
                draft: current, ..
            } => {
                *current = draft;
            }
        }
    }

    /// Submits the open form, creating or updating through the gateway.
    ///
    /// The draft is validated locally with the server's presence rules. On
    /// success the form closes and the list is re-fetched in full; on failure
    /// the form stays open with the draft preserved.
    pub async fn submit(&mut self) {
        self.state.error = None;
        match self.state.form.clone() {
            FormState::Hidden => {
                self.state.error = Some("no form is open".to_string());
            }
            FormState::Creating {
                draft,
            } => {
                if !draft.has_required_fields() {
                    self.state.error = Some(REQUIRED_FIELDS_MESSAGE.to_string());
                    return;
                }
                match self.gateway.create(&draft).await {
                    Ok(_) => {
                        self.state.form = FormState::Hidden;
                        self.refresh().await;
                    }
                    Err(err) => self.fail(&err),
                }
            }
            FormState::Editing {
                target,
                draft,
            } => {
                if !draft.has_required_fields() {
                    self.state.error = Some(REQUIRED_FIELDS_MESSAGE.to_string());
                    return;
                }
                match self.gateway.update(target.id, &draft).await {
                    Ok(_) => {
                        self.state.form = FormState::Hidden;
                        self.refresh().await;
                    }
                    Err(err) => self.fail(&err),
                }
            }
        }
    }

    /// Deletes a record after confirmation, then re-fetches the list.
    ///
    /// A declined prompt changes nothing and issues no request. An id not
    /// present in `records` is a no-op with an error message and no prompt.
    pub async fn delete(&mut self, id: RecordId, prompt: &dyn DeletePrompt) {
        self.state.error = None;
        let Some(target) = self.find_record(id) else {
            self.state.error = Some(MISSING_RECORD_MESSAGE.to_string());
            return;
        };
        if !prompt.confirm_delete(&target) {
            return;
        }
        match self.gateway.delete(id).await {
            Ok(_) => self.refresh().await,
            Err(err) => self.fail(&err),
        }
    }

    /// Looks up a record in the current list.
    fn find_record(&self, id: RecordId) -> Option<UserRecord> {
        self.state.records.iter().find(|record| record.id == id).cloned()
    }

    /// Records a gateway failure in view state.
    fn fail(&mut self, error: &GatewayError) {
        self.state.error = Some(error.user_message());
    }
}
