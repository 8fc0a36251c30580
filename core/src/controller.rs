//! The modal-form state machine that keeps the local list consistent with
//! the server.
//!
//! # Design
//! `CrudController` owns the authoritative client-side cache of
//! applications, the modal state, the edit draft and all user-facing error
//! state. Every action drives the stateless clients through an injected
//! [`Transport`] and converts any failure into state the presentational
//! layer renders — nothing is retried and nothing propagates out as an
//! error.
//!
//! The list is replaced wholesale after every successful mutation: the
//! refetch, not the mutation response body, is the source of truth for what
//! the server persisted. Within `submit` the refetch completes before the
//! modal closes, so the list visible after closing already reflects the
//! mutation.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::client::ApplicationClient;
use crate::draft::{ApplicationDraft, DraftEdit};
use crate::http::{Payload, Transport};
use crate::types::Application;

/// Client-side validation message for blank required fields.
pub const MSG_REQUIRED_FIELDS: &str = "company and position are required";
/// General message shown alongside server-side 422 field errors.
pub const MSG_VALIDATION_FAILED: &str = "please fill in the required fields";
/// Shown when the server rejects the session or anti-forgery token (419).
pub const MSG_SESSION_INVALID: &str =
    "your session or anti-forgery token is no longer valid, reload the page and retry";
/// List-level message when the initial or refetch load fails.
pub const MSG_LIST_UNAVAILABLE: &str =
    "could not load applications, verify the backend is reachable";
/// Alert shown when a delete is rejected.
pub const MSG_REMOVE_FAILED: &str = "could not delete the application";
/// Alert shown when delete-all is rejected.
pub const MSG_REMOVE_ALL_FAILED: &str = "could not delete the applications";

/// Whether the modal is closed, creating a new application, or editing an
/// existing one. The editing target is a lookup key, not ownership — the
/// draft is never written back to the list directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Idle,
    Creating,
    Editing { id: i64 },
}

/// A yes/no decision obtained from the user before a destructive action.
pub trait ConfirmRemoval {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Orchestrates clients, draft and modal visibility.
#[derive(Debug)]
pub struct CrudController {
    client: ApplicationClient,
    session: AuthSession,
    state: ModalState,
    draft: ApplicationDraft,
    general_error: Option<String>,
    field_errors: BTreeMap<String, Vec<String>>,
    alert: Option<String>,
    applications: Vec<Application>,
    loading: bool,
    list_error: Option<String>,
}

impl CrudController {
    pub fn new(client: ApplicationClient, session: AuthSession) -> Self {
        Self {
            client,
            session,
            state: ModalState::Idle,
            draft: ApplicationDraft::default(),
            general_error: None,
            field_errors: BTreeMap::new(),
            alert: None,
            applications: Vec::new(),
            loading: false,
            list_error: None,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_modal_open(&self) -> bool {
        self.state != ModalState::Idle
    }

    /// Title for the modal-display collaborator.
    pub fn modal_title(&self) -> &'static str {
        match self.state {
            ModalState::Idle => "",
            ModalState::Creating => "New application",
            ModalState::Editing { .. } => "Edit application",
        }
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.field_errors
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AuthSession {
        &mut self.session
    }

    /// Open the modal for a new application. Opening while already open
    /// simply replaces the draft and target (last writer wins).
    pub fn open_create(&mut self) {
        self.state = ModalState::Creating;
        self.draft = ApplicationDraft::default();
        self.clear_form_errors();
    }

    /// Open the modal seeded with an existing application's fields.
    pub fn open_edit(&mut self, application: &Application) {
        self.state = ModalState::Editing { id: application.id };
        self.draft = ApplicationDraft::from_application(application);
        self.clear_form_errors();
    }

    /// Apply one field change to the draft. No state transition.
    pub fn change_field(&mut self, edit: DraftEdit) {
        self.draft = self.draft.update(edit);
    }

    /// Discard the draft and close the modal. No network call.
    pub fn cancel(&mut self) {
        self.state = ModalState::Idle;
        self.draft = ApplicationDraft::default();
        self.clear_form_errors();
    }

    /// Validate, persist the draft, and on success refetch the list and
    /// close the modal. On failure the modal stays open with the draft
    /// intact so the user can correct and resubmit — nothing is retried
    /// automatically.
    pub fn submit(&mut self, transport: &dyn Transport) {
        let mut draft = self.draft.clone();
        draft.company = draft.company.trim().to_string();
        draft.position = draft.position.trim().to_string();
        if draft.company.is_empty() || draft.position.is_empty() {
            self.general_error = Some(MSG_REQUIRED_FIELDS.to_string());
            return;
        }

        // The editing target selects the verb and URL: none → POST to the
        // collection, some id → PUT to the member.
        let built = match self.state {
            ModalState::Idle => return,
            ModalState::Creating => self.client.build_create(&self.session, &draft),
            ModalState::Editing { id } => self.client.build_update(&self.session, id, &draft),
        };
        let request = match built {
            Ok(request) => request,
            Err(error) => {
                self.general_error = Some(format!("save failed ({error})"));
                return;
            }
        };
        debug!(method = ?request.method, path = %request.path, "submitting application form");

        let response = match transport.execute(request) {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "application save never reached the server");
                self.general_error = Some(format!("save failed ({error})"));
                return;
            }
        };
        let outcome = match self.state {
            ModalState::Editing { .. } => self.client.parse_update(response),
            _ => self.client.parse_create(response),
        };

        if outcome.is_success() {
            // Refetch before closing so the list visible after the modal
            // disappears already reflects the mutation.
            self.load_applications(transport);
            self.state = ModalState::Idle;
            self.draft = ApplicationDraft::default();
            self.clear_form_errors();
            return;
        }

        match outcome.status {
            422 => {
                self.field_errors = extract_field_errors(&outcome.payload);
                self.general_error = Some(MSG_VALIDATION_FAILED.to_string());
            }
            419 => {
                self.field_errors.clear();
                self.general_error = Some(MSG_SESSION_INVALID.to_string());
            }
            status => {
                warn!(status, "application save rejected");
                self.field_errors.clear();
                self.general_error = Some(format!("save failed (HTTP {status})"));
            }
        }
    }

    /// Delete one application after user confirmation. Independent of modal
    /// state. On success the list is refetched; on failure an alert-level
    /// message is set.
    pub fn remove(&mut self, transport: &dyn Transport, confirm: &dyn ConfirmRemoval, id: i64) {
        if !confirm.confirm("Delete this application?") {
            return;
        }
        self.alert = None;
        let request = self.client.build_delete(&self.session, id);
        let result = transport
            .execute(request)
            .and_then(|response| self.client.parse_delete(response));
        match result {
            Ok(()) => self.load_applications(transport),
            Err(error) => {
                warn!(%error, id, "application delete failed");
                self.alert = Some(MSG_REMOVE_FAILED.to_string());
            }
        }
    }

    /// Delete the whole collection after user confirmation.
    pub fn remove_all(&mut self, transport: &dyn Transport, confirm: &dyn ConfirmRemoval) {
        if !confirm.confirm("Delete all applications?") {
            return;
        }
        self.alert = None;
        let request = self.client.build_delete_all(&self.session);
        let result = transport
            .execute(request)
            .and_then(|response| self.client.parse_delete_all(response));
        match result {
            Ok(()) => self.load_applications(transport),
            Err(error) => {
                warn!(%error, "delete-all failed");
                self.alert = Some(MSG_REMOVE_ALL_FAILED.to_string());
            }
        }
    }

    /// Fetch the full list and replace the local cache wholesale. The
    /// loading flag is cleared on every path out.
    pub fn load_applications(&mut self, transport: &dyn Transport) {
        self.loading = true;
        self.list_error = None;
        let result = transport
            .execute(self.client.build_list(&self.session))
            .and_then(|response| self.client.parse_list(response));
        match result {
            Ok(applications) => self.applications = applications,
            Err(error) => {
                warn!(%error, "application list fetch failed");
                self.list_error = Some(MSG_LIST_UNAVAILABLE.to_string());
            }
        }
        self.loading = false;
    }

    fn clear_form_errors(&mut self) {
        self.general_error = None;
        self.field_errors.clear();
    }
}

/// Pull the per-field violation map out of a 422 payload. A missing or
/// malformed `errors` object yields an empty map.
fn extract_field_errors(payload: &Payload) -> BTreeMap<String, Vec<String>> {
    let Payload::Structured(value) = payload else {
        return BTreeMap::new();
    };
    let Some(errors) = value.get("errors").and_then(|e| e.as_object()) else {
        return BTreeMap::new();
    };
    errors
        .iter()
        .map(|(field, messages)| {
            let messages = messages
                .as_array()
                .map(|list| {
                    list.iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            (field.clone(), messages)
        })
        .collect()
}
