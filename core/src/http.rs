//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and parses `HttpResponse` values without ever touching the
//! network; the host supplies a [`Transport`] that executes the round-trip.
//! This separation keeps the core deterministic and easy to test.
//!
//! A response body is not trusted to match its status: the tracker backend
//! returns JSON for structured errors (422 validation maps) but can also
//! serve arbitrary HTML/text error pages. [`HttpResponse::payload`] resolves
//! that ambiguity into the [`Payload`] sum type once, so no caller ever
//! parses a body twice or crashes on a non-JSON one.

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by the `build_*` client methods. The host executes it against the
/// network and returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }

    /// Resolve the body into structured JSON or opaque text based on the
    /// `Content-Type` header. A body that claims JSON but does not parse
    /// degrades to `Opaque` rather than failing.
    pub fn payload(&self) -> Payload {
        let claims_json = self
            .content_type()
            .is_some_and(|ct| ct.contains("application/json"));
        if claims_json {
            if let Ok(value) = serde_json::from_str(&self.body) {
                return Payload::Structured(value);
            }
        }
        Payload::Opaque(self.body.clone())
    }
}

/// A response body after content-type resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The server sent `application/json` and the body parsed.
    Structured(serde_json::Value),
    /// Anything else — an HTML error page, plain text, or unparseable JSON.
    Opaque(String),
}

/// Executes one HTTP round-trip on behalf of the core.
///
/// Implemented over a real agent by the host and over scripted responses in
/// tests. The core issues at most one request at a time per user action; the
/// trait carries no cancellation or retry surface.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}
