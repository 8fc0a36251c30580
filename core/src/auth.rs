//! Authentication session and transport strategies.
//!
//! # Design
//! The tracker backend is deployed behind one of two mutually exclusive
//! credential transports: cookie sessions with an anti-forgery token, or
//! bearer tokens. [`AuthSession`] holds at most one active token and knows
//! which strategy it belongs to; every outgoing request asks the session for
//! its credential headers instead of reading ambient state. The session is
//! mutated only by `login`, `logout` and `fetch_csrf_token`.
//!
//! In session mode the cookie jar itself belongs to the host's HTTP agent —
//! the core only echoes the anti-forgery token on mutating calls.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Payload, Transport};
use crate::types::{Credentials, LoginResponse, User};

/// Which credential transport the deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>` on every call.
    Bearer,
    /// Cookie session; `X-CSRF-TOKEN` echoed on mutating calls.
    SessionCsrf,
}

/// The process-wide credential state: one token or none.
#[derive(Debug, Clone)]
pub struct AuthSession {
    strategy: AuthStrategy,
    token: Option<String>,
}

impl AuthSession {
    pub fn bearer() -> Self {
        Self {
            strategy: AuthStrategy::Bearer,
            token: None,
        }
    }

    pub fn session_csrf() -> Self {
        Self {
            strategy: AuthStrategy::SessionCsrf,
            token: None,
        }
    }

    /// Rehydrate a session from a token the host persisted earlier.
    pub fn resume(strategy: AuthStrategy, token: &str) -> Self {
        Self {
            strategy,
            token: Some(token.to_string()),
        }
    }

    pub fn strategy(&self) -> AuthStrategy {
        self.strategy
    }

    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Credential headers for one outgoing request. Bearer tokens go on
    /// every call; the anti-forgery token only on mutating ones. An empty
    /// session contributes nothing.
    pub(crate) fn credential_headers(&self, mutating: bool) -> Vec<(String, String)> {
        match (self.strategy, &self.token) {
            (AuthStrategy::Bearer, Some(token)) => {
                vec![("authorization".to_string(), format!("Bearer {token}"))]
            }
            (AuthStrategy::SessionCsrf, Some(token)) if mutating => {
                vec![("x-csrf-token".to_string(), token.clone())]
            }
            _ => Vec::new(),
        }
    }

    /// Post the credentials; on success store the returned token as the
    /// active session and hand back the user profile.
    pub fn login(
        &mut self,
        client: &AuthClient,
        transport: &dyn Transport,
        credentials: &Credentials,
    ) -> Result<User, ApiError> {
        let request = client.build_login(credentials)?;
        let response = transport.execute(request)?;
        let login = client.parse_login(response)?;
        self.token = Some(login.token);
        Ok(login.user)
    }

    /// Request server-side session termination, then clear the local token
    /// unconditionally — once logout is requested the token is presumed
    /// invalid whatever the server says. Returns whether the server call
    /// itself landed in the success range.
    pub fn logout(&mut self, client: &AuthClient, transport: &dyn Transport) -> bool {
        let request = client.build_logout(self);
        let ok = matches!(transport.execute(request), Ok(response) if response.is_success());
        self.token = None;
        ok
    }

    /// Obtain a fresh anti-forgery token and make it the active credential.
    /// Only meaningful in session mode.
    pub fn fetch_csrf_token(
        &mut self,
        client: &AuthClient,
        transport: &dyn Transport,
    ) -> Result<(), ApiError> {
        let request = client.build_csrf_token();
        let response = transport.execute(request)?;
        self.token = Some(client.parse_csrf_token(response)?);
        Ok(())
    }
}

/// Stateless request builder / response parser for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(credentials)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/auth/login", self.base_url),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    /// On rejection, prefer the server's own `message` field; a non-JSON
    /// body falls back to a plain HTTP-status message.
    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        if !response.is_success() {
            let message = match response.payload() {
                Payload::Structured(value) => value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", response.status)),
                Payload::Opaque(_) => format!("HTTP {}", response.status),
            };
            return Err(ApiError::Auth(message));
        }
        match response.payload() {
            Payload::Structured(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            Payload::Opaque(_) => Err(ApiError::Deserialization(
                "login response was not JSON".to_string(),
            )),
        }
    }

    pub fn build_logout(&self, session: &AuthSession) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        headers.extend(session.credential_headers(true));
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/auth/logout", self.base_url),
            headers,
            body: None,
        }
    }

    pub fn build_csrf_token(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/csrf-token", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn parse_csrf_token(&self, response: HttpResponse) -> Result<String, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        match response.payload() {
            Payload::Structured(value) => value
                .get("token")
                .and_then(|t| t.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    ApiError::Deserialization("csrf response missing token field".to_string())
                }),
            Payload::Opaque(_) => Err(ApiError::Deserialization(
                "csrf response was not JSON".to_string(),
            )),
        }
    }
}
