//! Stateless HTTP request builder and response parser for the applications
//! resource.
//!
//! # Design
//! `ApplicationClient` holds only a `base_url` and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the host executes the round-trip in between. Credentials
//! are injected per call through the `AuthSession` rather than read from
//! ambient state.
//!
//! List and delete fail with `ApiError` on any non-2xx status. Create and
//! update instead return a [`MutationOutcome`] whatever the status, because
//! the controller must branch on 422 vs 419 vs other to choose the
//! user-facing message — collapsing those into one error type would lose the
//! field-level validation map.

use crate::auth::AuthSession;
use crate::draft::ApplicationDraft;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Payload};
use crate::types::Application;

/// Raw outcome of a create or update, left for the caller to interpret.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub status: u16,
    pub payload: Payload,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Synchronous, stateless client for the applications resource.
#[derive(Debug, Clone)]
pub struct ApplicationClient {
    base_url: String,
}

impl ApplicationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/applications", self.base_url)
    }

    fn member_url(&self, id: i64) -> String {
        format!("{}/api/applications/{id}", self.base_url)
    }

    fn headers(session: &AuthSession, mutating: bool, has_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if has_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.extend(session.credential_headers(mutating));
        headers
    }

    pub fn build_list(&self, session: &AuthSession) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Self::headers(session, false, false),
            body: None,
        }
    }

    /// A success payload that is not an array is coerced to an empty list —
    /// the server promises an array, but unchecked external input is never
    /// trusted.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Application>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        match response.payload() {
            Payload::Structured(value) if value.is_array() => serde_json::from_value(value)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            _ => Ok(Vec::new()),
        }
    }

    pub fn build_create(
        &self,
        session: &AuthSession,
        draft: &ApplicationDraft,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: Self::headers(session, true, true),
            body: Some(body),
        })
    }

    pub fn parse_create(&self, response: HttpResponse) -> MutationOutcome {
        MutationOutcome {
            status: response.status,
            payload: response.payload(),
        }
    }

    pub fn build_update(
        &self,
        session: &AuthSession,
        id: i64,
        draft: &ApplicationDraft,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.member_url(id),
            headers: Self::headers(session, true, true),
            body: Some(body),
        })
    }

    pub fn parse_update(&self, response: HttpResponse) -> MutationOutcome {
        MutationOutcome {
            status: response.status,
            payload: response.payload(),
        }
    }

    pub fn build_delete(&self, session: &AuthSession, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.member_url(id),
            headers: Self::headers(session, true, false),
            body: None,
        }
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }

    pub fn build_delete_all(&self, session: &AuthSession) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.collection_url(),
            headers: Self::headers(session, true, false),
            body: None,
        }
    }

    pub fn parse_delete_all(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_delete(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthStrategy;
    use crate::draft::DraftEdit;

    fn client() -> ApplicationClient {
        ApplicationClient::new("http://localhost:3000")
    }

    fn draft() -> ApplicationDraft {
        ApplicationDraft::default()
            .update(DraftEdit::Company("Acme".to_string()))
            .update(DraftEdit::Position("Engineer".to_string()))
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_targets_collection() {
        let req = client().build_list(&AuthSession::bearer());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/applications");
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_carries_bearer_token() {
        let session = AuthSession::resume(AuthStrategy::Bearer, "tok-1");
        let req = client().build_list(&session);
        assert!(req
            .headers
            .contains(&("authorization".to_string(), "Bearer tok-1".to_string())));
    }

    #[test]
    fn build_list_omits_csrf_token_on_reads() {
        let session = AuthSession::resume(AuthStrategy::SessionCsrf, "csrf-1");
        let req = client().build_list(&session);
        assert!(!req.headers.iter().any(|(name, _)| name == "x-csrf-token"));
    }

    #[test]
    fn build_create_targets_collection_with_body() {
        let req = client().build_create(&AuthSession::bearer(), &draft()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/applications");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["company"], "Acme");
        assert_eq!(body["position"], "Engineer");
        assert_eq!(body["status"], "applied");
    }

    #[test]
    fn build_update_targets_member_url() {
        let session = AuthSession::resume(AuthStrategy::SessionCsrf, "csrf-1");
        let req = client().build_update(&session, 5, &draft()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/applications/5");
        assert!(req
            .headers
            .contains(&("x-csrf-token".to_string(), "csrf-1".to_string())));
    }

    #[test]
    fn build_delete_targets_member_url() {
        let req = client().build_delete(&AuthSession::bearer(), 9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/applications/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_delete_all_targets_collection() {
        let req = client().build_delete_all(&AuthSession::bearer());
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/applications");
    }

    #[test]
    fn parse_list_success() {
        let body = r#"[{"id":1,"company":"Acme","position":"Engineer","status":"applied","created_at":"2024-01-01T00:00:00Z"}]"#;
        let apps = client().parse_list(json_response(200, body)).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].company, "Acme");
    }

    #[test]
    fn parse_list_coerces_non_array_to_empty() {
        let apps = client()
            .parse_list(json_response(200, r#"{"data":"unexpected"}"#))
            .unwrap();
        assert!(apps.is_empty());
    }

    #[test]
    fn parse_list_coerces_opaque_body_to_empty() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: "[]".to_string(),
        };
        let apps = client().parse_list(response).unwrap();
        assert!(apps.is_empty());
    }

    #[test]
    fn parse_list_non_2xx_is_an_error() {
        let err = client().parse_list(json_response(500, "{}")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[test]
    fn parse_create_returns_outcome_for_422() {
        let outcome = client().parse_create(json_response(
            422,
            r#"{"message":"The given data was invalid.","errors":{"company":["required"]}}"#,
        ));
        assert_eq!(outcome.status, 422);
        assert!(!outcome.is_success());
        let Payload::Structured(value) = outcome.payload else {
            panic!("expected structured payload");
        };
        assert_eq!(value["errors"]["company"][0], "required");
    }

    #[test]
    fn parse_update_keeps_opaque_error_bodies() {
        let response = HttpResponse {
            status: 500,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: "<h1>boom</h1>".to_string(),
        };
        let outcome = client().parse_update(response);
        assert_eq!(outcome.status, 500);
        assert_eq!(outcome.payload, Payload::Opaque("<h1>boom</h1>".to_string()));
    }

    #[test]
    fn parse_delete_success_range() {
        assert!(client().parse_delete(json_response(204, "")).is_ok());
        assert!(client().parse_delete(json_response(200, "")).is_ok());
        let err = client().parse_delete(json_response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ApplicationClient::new("http://localhost:3000/");
        let req = client.build_list(&AuthSession::bearer());
        assert_eq!(req.path, "http://localhost:3000/api/applications");
    }
}
