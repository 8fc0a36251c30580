//! Domain DTOs for the tracker API.
//!
//! # Design
//! These types mirror the backend's schema but are defined independently
//! from the mock-server crate; integration tests catch any drift between
//! the two. `Status` is a closed enum rather than a string so an invalid
//! stage can never be submitted, and its display labels live here as pure
//! data for the presentational layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stage of a job application, in the order the pipeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Applied,
    InvitedToInterview,
    InterviewDone,
    TestAssigned,
    TestSubmitted,
    Offer,
    Rejected,
}

impl Status {
    /// All stages in display order, for select-style pickers.
    pub const ALL: [Status; 7] = [
        Status::Applied,
        Status::InvitedToInterview,
        Status::InterviewDone,
        Status::TestAssigned,
        Status::TestSubmitted,
        Status::Offer,
        Status::Rejected,
    ];

    /// Wire name, as serialized into request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::InvitedToInterview => "invited_to_interview",
            Status::InterviewDone => "interview_done",
            Status::TestAssigned => "test_assigned",
            Status::TestSubmitted => "test_submitted",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
        }
    }

    /// Human-readable label for list rows and pickers.
    pub fn label(self) -> &'static str {
        match self {
            Status::Applied => "Application sent",
            Status::InvitedToInterview => "Invited to interview",
            Status::InterviewDone => "Interview done",
            Status::TestAssigned => "Test assigned",
            Status::TestSubmitted => "Test submitted",
            Status::Offer => "Received an offer",
            Status::Rejected => "Rejected",
        }
    }
}

/// A persisted job application as returned by the API.
///
/// `id` and `created_at` are server-assigned; the client never fabricates
/// either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Login request payload for bearer-mode authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Successful login response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
