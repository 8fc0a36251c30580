//! The in-progress edit buffer for one application.
//!
//! # Design
//! A draft is always fully populated so the form collaborator can render
//! every field as a controlled input. Field replacement goes through the
//! [`DraftEdit`] tagged union instead of a name-keyed dictionary, so a typo
//! in a field name is a compile error. Validation does not live here — the
//! controller validates, because it needs cross-field context to produce the
//! general message and the per-field flags together.

use serde::Serialize;

use crate::types::{Application, Status};

/// Editable fields of an application, fully populated at all times.
///
/// Serializes directly as a create/update request body. An empty description
/// is omitted from the body rather than sent as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDraft {
    pub company: String,
    pub position: String,
    pub status: Status,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Default for ApplicationDraft {
    /// The create-mode starting point: empty text fields, status `applied`.
    fn default() -> Self {
        Self {
            company: String::new(),
            position: String::new(),
            status: Status::Applied,
            description: String::new(),
        }
    }
}

/// One single-field replacement to apply to a draft.
#[derive(Debug, Clone)]
pub enum DraftEdit {
    Company(String),
    Position(String),
    Status(Status),
    Description(String),
}

impl ApplicationDraft {
    /// Seed an edit-mode draft from a persisted application.
    pub fn from_application(application: &Application) -> Self {
        Self {
            company: application.company.clone(),
            position: application.position.clone(),
            status: application.status,
            description: application.description.clone().unwrap_or_default(),
        }
    }

    /// Return a new draft with exactly one field replaced.
    pub fn update(&self, edit: DraftEdit) -> Self {
        let mut next = self.clone();
        match edit {
            DraftEdit::Company(value) => next.company = value,
            DraftEdit::Position(value) => next.position = value,
            DraftEdit::Status(value) => next.status = value,
            DraftEdit::Description(value) => next.description = value,
        }
        next
    }
}
