//! Synchronous client core for the job-application tracker API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host hands the core a
//! [`Transport`] implementation for the actual HTTP round-trip, so every
//! state transition in the core is deterministic and testable offline.
//!
//! # Design
//! - `ApplicationClient` and `AuthClient` are stateless — they hold only a
//!   `base_url`. Each operation is split into `build_*` (produces a request)
//!   and `parse_*` (consumes a response), keeping the I/O boundary explicit.
//! - `AuthSession` is an explicit context object passed into every `build_*`
//!   call; there is no ambient token state.
//! - `CrudController` owns the modal-form state machine: it drives the
//!   clients through the injected transport and converts every failure into
//!   user-visible error state rather than propagating it.
//! - Server error bodies may be JSON or arbitrary text; [`Payload`] makes
//!   that distinction a sum type so callers branch exhaustively.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod controller;
pub mod draft;
pub mod error;
pub mod http;
pub mod types;

pub use auth::{AuthClient, AuthSession, AuthStrategy};
pub use client::{ApplicationClient, MutationOutcome};
pub use controller::{ConfirmRemoval, CrudController, ModalState};
pub use draft::{ApplicationDraft, DraftEdit};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Payload, Transport};
pub use types::{Application, Credentials, LoginResponse, Status, User};
