//! In-memory stand-in for the job-application tracker backend.
//!
//! Implements the resource endpoints plus both credential transports the
//! real deployment offers: bearer tokens minted by `/api/auth/login` and an
//! anti-forgery token served by `/csrf-token`. The server is permissive —
//! requests without credentials are allowed — but a credential that is
//! present and wrong is rejected (401 for unknown bearer tokens, 419 for a
//! stale anti-forgery token), which is what the client tests need to
//! exercise.
//!
//! Validation mirrors the real backend: blank `company`/`position` or an
//! unknown `status` produce a 422 with a `{message, errors}` body.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

const STATUSES: [&str; 7] = [
    "applied",
    "invited_to_interview",
    "interview_done",
    "test_assigned",
    "test_submitted",
    "offer",
    "rejected",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationInput {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub description: Option<String>,
}

fn default_status() -> String {
    "applied".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug)]
pub struct ServerState {
    db: RwLock<HashMap<i64, Application>>,
    next_id: AtomicI64,
    csrf_token: String,
    bearer_tokens: RwLock<HashSet<String>>,
}

pub type SharedState = Arc<ServerState>;

pub fn app() -> Router {
    let state: SharedState = Arc::new(ServerState {
        db: RwLock::new(HashMap::new()),
        next_id: AtomicI64::new(1),
        csrf_token: fresh_token("csrf"),
        bearer_tokens: RwLock::new(HashSet::new()),
    });
    Router::new()
        .route(
            "/api/applications",
            get(list_applications)
                .post(create_application)
                .delete(delete_all_applications),
        )
        .route(
            "/api/applications/{id}",
            axum::routing::put(update_application).delete(delete_application),
        )
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/csrf-token", get(csrf_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn fresh_token(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{prefix}-{nanos:x}")
}

fn page_expired() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN)
}

/// Reject requests carrying a credential the server does not recognize.
/// Absent credentials pass — the mock stays usable in both transport modes.
async fn credential_rejection(
    state: &ServerState,
    headers: &HeaderMap,
    mutating: bool,
) -> Option<Response> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if !state.bearer_tokens.read().await.contains(token) {
                return Some(
                    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."})))
                        .into_response(),
                );
            }
        }
    }
    if mutating {
        if let Some(value) = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()) {
            if value != state.csrf_token {
                return Some(
                    (page_expired(), Json(json!({"message": "CSRF token mismatch."})))
                        .into_response(),
                );
            }
        }
    }
    None
}

fn validate(input: &ApplicationInput) -> BTreeMap<&'static str, Vec<&'static str>> {
    let mut errors = BTreeMap::new();
    if input.company.trim().is_empty() {
        errors.insert("company", vec!["The company field is required."]);
    }
    if input.position.trim().is_empty() {
        errors.insert("position", vec!["The position field is required."]);
    }
    if !STATUSES.contains(&input.status.as_str()) {
        errors.insert("status", vec!["The selected status is invalid."]);
    }
    errors
}

fn validation_failure(errors: BTreeMap<&'static str, Vec<&'static str>>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"message": "The given data was invalid.", "errors": errors})),
    )
        .into_response()
}

async fn list_applications(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = credential_rejection(&state, &headers, false).await {
        return rejection;
    }
    let db = state.db.read().await;
    let mut applications: Vec<Application> = db.values().cloned().collect();
    applications.sort_by_key(|a| a.id);
    Json(applications).into_response()
}

async fn create_application(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<ApplicationInput>,
) -> Response {
    if let Some(rejection) = credential_rejection(&state, &headers, true).await {
        return rejection;
    }
    let errors = validate(&input);
    if !errors.is_empty() {
        return validation_failure(errors);
    }
    let application = Application {
        id: state.next_id.fetch_add(1, Ordering::Relaxed),
        company: input.company,
        position: input.position,
        status: input.status,
        description: input.description.filter(|d| !d.is_empty()),
        created_at: Utc::now(),
    };
    debug!(id = application.id, "application created");
    state.db.write().await.insert(application.id, application.clone());
    (StatusCode::CREATED, Json(application)).into_response()
}

async fn update_application(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<ApplicationInput>,
) -> Response {
    if let Some(rejection) = credential_rejection(&state, &headers, true).await {
        return rejection;
    }
    let errors = validate(&input);
    if !errors.is_empty() {
        return validation_failure(errors);
    }
    let mut db = state.db.write().await;
    let Some(application) = db.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    application.company = input.company;
    application.position = input.position;
    application.status = input.status;
    application.description = input.description.filter(|d| !d.is_empty());
    Json(application.clone()).into_response()
}

async fn delete_application(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = credential_rejection(&state, &headers, true).await {
        return rejection;
    }
    match state.db.write().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_all_applications(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = credential_rejection(&state, &headers, true).await {
        return rejection;
    }
    state.db.write().await.clear();
    StatusCode::NO_CONTENT.into_response()
}

async fn login(State(state): State<SharedState>, Json(input): Json<LoginInput>) -> Response {
    if !input.email.contains('@') || input.password.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials."})),
        )
            .into_response();
    }
    let token = fresh_token("token");
    state.bearer_tokens.write().await.insert(token.clone());
    let name = input.email.split('@').next().unwrap_or_default().to_string();
    Json(json!({
        "token": token,
        "user": {"id": 1, "name": name, "email": input.email},
    }))
    .into_response()
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.bearer_tokens.write().await.remove(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn csrf_token(State(state): State<SharedState>) -> Response {
    Json(json!({"token": state.csrf_token})).into_response()
}
