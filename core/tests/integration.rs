//! Full controller lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the CRUD controller
//! and auth session over real HTTP through a ureq-backed `Transport`.
//! Validates that request building, credential injection and response
//! parsing work end-to-end with the actual server.

use jobtrack_core::{
    ApiError, ApplicationClient, AuthClient, AuthSession, AuthStrategy, ConfirmRemoval,
    Credentials, CrudController, DraftEdit, HttpMethod, HttpRequest, HttpResponse, ModalState,
    Status, Transport,
};

/// Execute `HttpRequest` values with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data — status interpretation belongs to the core.
struct UreqTransport;

fn with_headers<Any>(
    mut builder: ureq::RequestBuilder<Any>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<Any> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        let mut response = match (req.method, req.body) {
            (HttpMethod::Get, _) => with_headers(agent.get(&req.path), &req.headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), &req.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(agent.post(&req.path), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(agent.post(&req.path), &req.headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(agent.put(&req.path), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(agent.put(&req.path), &req.headers).send_empty()
            }
        }
        .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

struct AlwaysConfirm;

impl ConfirmRemoval for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[test]
fn crud_lifecycle_through_controller() {
    let base = start_server();
    let transport = UreqTransport;
    let mut c = CrudController::new(ApplicationClient::new(&base), AuthSession::bearer());

    // Initial load — empty.
    c.load_applications(&transport);
    assert!(c.list_error().is_none());
    assert!(c.applications().is_empty());

    // Create.
    c.open_create();
    c.change_field(DraftEdit::Company("Acme".to_string()));
    c.change_field(DraftEdit::Position("Engineer".to_string()));
    c.change_field(DraftEdit::Description("referred by Sam".to_string()));
    c.submit(&transport);
    assert_eq!(c.state(), ModalState::Idle);
    assert!(c.general_error().is_none());
    assert_eq!(c.applications().len(), 1);
    let created = c.applications()[0].clone();
    assert_eq!(created.company, "Acme");
    assert_eq!(created.status, Status::Applied);
    assert_eq!(created.description.as_deref(), Some("referred by Sam"));

    // Edit — full draft goes over the wire, list reflects the refetch.
    c.open_edit(&created);
    c.change_field(DraftEdit::Status(Status::Offer));
    c.submit(&transport);
    assert_eq!(c.state(), ModalState::Idle);
    assert_eq!(c.applications().len(), 1);
    assert_eq!(c.applications()[0].status, Status::Offer);
    assert_eq!(c.applications()[0].company, "Acme");
    assert_eq!(c.applications()[0].id, created.id);

    // Delete.
    c.remove(&transport, &AlwaysConfirm, created.id);
    assert!(c.alert().is_none());
    assert!(c.applications().is_empty());

    // Delete-all with a repopulated collection.
    c.open_create();
    c.change_field(DraftEdit::Company("Globex".to_string()));
    c.change_field(DraftEdit::Position("Analyst".to_string()));
    c.submit(&transport);
    assert_eq!(c.applications().len(), 1);
    c.remove_all(&transport, &AlwaysConfirm);
    assert!(c.applications().is_empty());
}

#[test]
fn stale_antiforgery_token_maps_to_session_error() {
    let base = start_server();
    let transport = UreqTransport;
    let session = AuthSession::resume(AuthStrategy::SessionCsrf, "csrf-stale");
    let mut c = CrudController::new(ApplicationClient::new(&base), session);

    c.open_create();
    c.change_field(DraftEdit::Company("Acme".to_string()));
    c.change_field(DraftEdit::Position("Engineer".to_string()));
    c.submit(&transport);

    // 419 from the server; modal stays open with the draft intact.
    assert_eq!(
        c.general_error(),
        Some(jobtrack_core::controller::MSG_SESSION_INVALID)
    );
    assert!(c.field_errors().is_empty());
    assert_eq!(c.state(), ModalState::Creating);
    assert_eq!(c.draft().company, "Acme");

    // A fresh token unblocks the same draft.
    let auth = AuthClient::new(&base);
    c.session_mut().fetch_csrf_token(&auth, &transport).unwrap();
    c.submit(&transport);
    assert_eq!(c.state(), ModalState::Idle);
    assert_eq!(c.applications().len(), 1);
}

#[test]
fn bearer_login_logout_lifecycle() {
    let base = start_server();
    let transport = UreqTransport;
    let auth = AuthClient::new(&base);
    let mut c = CrudController::new(ApplicationClient::new(&base), AuthSession::bearer());

    let credentials = Credentials {
        email: "jo@example.com".to_string(),
        password: "secret".to_string(),
    };
    let user = c.session_mut().login(&auth, &transport, &credentials).unwrap();
    assert_eq!(user.email, "jo@example.com");
    let token = c.session().current_token().unwrap().to_string();

    // The token is accepted on resource calls.
    c.open_create();
    c.change_field(DraftEdit::Company("Acme".to_string()));
    c.change_field(DraftEdit::Position("Engineer".to_string()));
    c.submit(&transport);
    assert_eq!(c.state(), ModalState::Idle);
    assert_eq!(c.applications().len(), 1);

    // Logout clears locally and invalidates server-side.
    assert!(c.session_mut().logout(&auth, &transport));
    assert!(c.session().current_token().is_none());

    let stale = AuthSession::resume(AuthStrategy::Bearer, &token);
    let mut stale_controller = CrudController::new(ApplicationClient::new(&base), stale);
    stale_controller.open_create();
    stale_controller.change_field(DraftEdit::Company("Acme".to_string()));
    stale_controller.change_field(DraftEdit::Position("Engineer".to_string()));
    stale_controller.submit(&transport);
    assert_eq!(
        stale_controller.general_error(),
        Some("save failed (HTTP 401)")
    );
}

#[test]
fn rejected_login_carries_server_message() {
    let base = start_server();
    let transport = UreqTransport;
    let auth = AuthClient::new(&base);
    let mut session = AuthSession::bearer();

    let credentials = Credentials {
        email: "jo@example.com".to_string(),
        password: String::new(),
    };
    let err = session.login(&auth, &transport, &credentials).unwrap_err();
    assert!(matches!(err, ApiError::Auth(message) if message == "Invalid credentials."));
    assert!(session.current_token().is_none());
}

#[test]
fn unreachable_backend_surfaces_list_error() {
    // Nothing listens on this port.
    let transport = UreqTransport;
    let mut c = CrudController::new(
        ApplicationClient::new("http://127.0.0.1:1"),
        AuthSession::bearer(),
    );
    c.load_applications(&transport);
    assert_eq!(
        c.list_error(),
        Some(jobtrack_core::controller::MSG_LIST_UNAVAILABLE)
    );
    assert!(!c.is_loading());
}
