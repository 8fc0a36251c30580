//! Error types for the tracker API client.
//!
//! # Design
//! Only failures the caller cannot branch on by status code become errors.
//! Create and update deliberately do NOT go through `ApiError` on non-2xx
//! responses — they return a [`crate::MutationOutcome`] so the controller can
//! distinguish 422 validation bodies from 419 session rejections. `ApiError`
//! covers everything else: unreachable network, unexpected statuses on
//! list/delete, malformed payloads, and rejected logins.

use thiserror::Error;

/// Errors surfaced by the clients and the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status outside the success range on an
    /// operation that has no per-status branching.
    #[error("HTTP {status}")]
    Http { status: u16, body: String },

    /// The server rejected the login; carries the server-supplied message
    /// when the payload had one, a generic HTTP-status message otherwise.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}
