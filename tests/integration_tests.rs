//! Integration tests for the authenticated client.
//!
//! Every test runs against an in-process mock of the backend REST
//! contract, instrumented with call counters so the token-lifecycle
//! invariants (single-flight refresh, retry-once, one-shot redirect) are
//! observable rather than assumed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

use taskdeck::api::ApiClient;
use taskdeck::api::tasks::{TaskDraft, TaskPatch};
use taskdeck::config::Config;
use taskdeck::data::TaskService;
use taskdeck::errors::{ApiError, AuthError};
use taskdeck::session::{RefreshCoordinator, SessionEvents, TokenStore};
use taskdeck_common::TaskStatus;

// =============================================================================
// Mock backend
// =============================================================================

/// Shared state for the mock backend. `valid_access` is the one access
/// token the protected endpoints accept; the refresh endpoint rotates
/// callers onto it when `refresh_token` matches.
struct MockBackend {
    valid_access: std::sync::Mutex<String>,
    refresh_token: String,
    refresh_calls: AtomicUsize,
    protected_calls: AtomicUsize,
    tasks: std::sync::Mutex<Vec<Value>>,
    next_task_id: AtomicUsize,
}

impl MockBackend {
    fn new(valid_access: &str, refresh_token: &str) -> Arc<Self> {
        Arc::new(Self {
            valid_access: std::sync::Mutex::new(valid_access.to_string()),
            refresh_token: refresh_token.to_string(),
            refresh_calls: AtomicUsize::new(0),
            protected_calls: AtomicUsize::new(0),
            tasks: std::sync::Mutex::new(Vec::new()),
            next_task_id: AtomicUsize::new(1),
        })
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

async fn login(State(state): State<Arc<MockBackend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"] == "ann" && body["password"] == "hunter2" {
        let access = state.valid_access.lock().unwrap().clone();
        (
            StatusCode::OK,
            Json(json!({
                "access": access,
                "refresh": state.refresh_token,
                "user": {"id": 1, "username": "ann", "role": "manager"},
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
    }
}

async fn refresh(State(state): State<Arc<MockBackend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Widen the race window so concurrent 401 handlers pile up on the
    // client-side gate rather than interleaving by luck.
    tokio::time::sleep(Duration::from_millis(50)).await;
    if body["refresh"] == state.refresh_token.as_str() {
        let rotated = format!("rotated-{}", state.refresh_calls.load(Ordering::SeqCst));
        *state.valid_access.lock().unwrap() = rotated.clone();
        (StatusCode::OK, Json(json!({"access": rotated})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired"})),
        )
    }
}

async fn logout(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    (StatusCode::OK, Json(json!({"message": "Logged out successfully"})))
}

async fn list_tasks(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.protected_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    let tasks = state.tasks.lock().unwrap().clone();
    // The real backend is inconsistent about envelopes; answer with one of
    // the wrapped shapes so normalization is exercised end to end.
    (StatusCode::OK, Json(json!({"results": tasks})))
}

async fn create_task(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    let id = state.next_task_id.fetch_add(1, Ordering::SeqCst);
    let task = json!({
        "id": id,
        "title": body["title"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "status": body.get("status").cloned().unwrap_or(json!("todo")),
        "assigned_to": body.get("assigned_to").cloned().unwrap_or(json!([])),
        "group": body.get("group").cloned().unwrap_or(Value::Null),
    });
    state.tasks.lock().unwrap().push(task.clone());
    (
        StatusCode::CREATED,
        Json(json!({"message": "Task created successfully", "task": task})),
    )
}

async fn update_task(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<usize>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    let mut tasks = state.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| t["id"] == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})));
    };
    if let Some(object) = body.as_object() {
        for (key, value) in object {
            task[key.as_str()] = value.clone();
        }
    }
    (StatusCode::OK, Json(task.clone()))
}

async fn delete_task(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<usize>,
    headers: HeaderMap,
) -> StatusCode {
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    state.tasks.lock().unwrap().retain(|t| t["id"] != id);
    StatusCode::NO_CONTENT
}

async fn list_users(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    (
        StatusCode::OK,
        Json(json!({"users": [
            {"id": 1, "username": "ann", "role": "manager"},
            {"id": 2, "username": "bob", "role": "employee"},
        ]})),
    )
}

async fn list_groups(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"})));
    }
    (
        StatusCode::OK,
        Json(json!([{"id": 1, "name": "Backend", "members": [2]}])),
    )
}

async fn start_backend(state: Arc<MockBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/users/login/", post(login))
        .route("/api/users/token/refresh/", post(refresh))
        .route("/api/users/logout/", post(logout))
        .route("/api/users/employees/", get(list_users))
        .route("/api/tasks/my-tasks/", get(list_tasks))
        .route("/api/tasks/create/", post(create_task))
        .route(
            "/api/tasks/{id}/",
            axum::routing::patch(update_task).delete(delete_task),
        )
        .route("/api/tasks/groups/", get(list_groups))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// Test harness
// =============================================================================

struct Harness {
    _dir: TempDir,
    backend: Arc<MockBackend>,
    config: Config,
    store: Arc<TokenStore>,
    events: Arc<SessionEvents>,
    client: Arc<ApiClient>,
}

async fn harness(backend: Arc<MockBackend>) -> Harness {
    let addr = start_backend(Arc::clone(&backend)).await;
    let dir = TempDir::new().unwrap();
    let config = Config {
        api_url: format!("http://{addr}"),
        session_file: dir.path().join("session.json"),
        timeout: Duration::from_secs(5),
    };
    let store = Arc::new(TokenStore::open(&config.session_file));
    let events = Arc::new(SessionEvents::new());
    let client = Arc::new(
        ApiClient::with_store(&config, Arc::clone(&store), Arc::clone(&events)).unwrap(),
    );
    Harness {
        _dir: dir,
        backend,
        config,
        store,
        events,
        client,
    }
}

// =============================================================================
// Token lifecycle
// =============================================================================

mod token_lifecycle {
    use super::*;

    #[tokio::test]
    async fn login_persists_the_token_pair() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;

        let user = h.client.login("ann", "hunter2").await.unwrap();
        assert_eq!(user.username, "ann");

        let session = h.store.get();
        assert_eq!(session.access.as_deref(), Some("access-0"));
        assert_eq!(session.refresh.as_deref(), Some("refresh-ok"));

        // the pair survives a reopen of the same session file
        let reopened = TokenStore::open(&h.config.session_file);
        assert_eq!(reopened.get(), session);
    }

    #[tokio::test]
    async fn bad_credentials_are_a_business_error_not_an_auth_failure() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;

        let err = h.client.login("ann", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_terminal_auth());
        assert!(!h.events.expired());
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;
        h.client.login("ann", "hunter2").await.unwrap();

        h.client.logout().await.unwrap();
        assert!(h.store.get().is_empty());
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed_transparently() {
        // Stored access token is stale; only the rotated one is accepted.
        let h = harness(MockBackend::new("fresh-access", "refresh-ok")).await;
        h.store.set_tokens("stale-access", "refresh-ok").unwrap();

        let tasks = h.client.list_tasks().await.unwrap();
        assert!(tasks.is_empty());

        // 401 then exactly one retry
        assert_eq!(h.backend.protected_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.backend.refresh_calls.load(Ordering::SeqCst), 1);
        // rotated token persisted for the next call
        assert!(h.store.access().unwrap().starts_with("rotated-"));
        assert!(!h.events.expired());
    }
}

// =============================================================================
// Single-flight refresh
// =============================================================================

mod single_flight {
    use super::*;

    #[tokio::test]
    async fn concurrent_401s_trigger_exactly_one_refresh_call() {
        let h = harness(MockBackend::new("fresh-access", "refresh-ok")).await;
        h.store.set_tokens("stale-access", "refresh-ok").unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&h.client);
            handles.push(tokio::spawn(async move { client.list_tasks().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(h.backend.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_refresh_token_fails_without_a_network_call() {
        let h = harness(MockBackend::new("fresh-access", "refresh-ok")).await;
        // empty session: the protected call answers 401 and refresh must
        // fail fast
        let err = h.client.list_tasks().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Auth(AuthError::NoRefreshToken)
        ));
        assert_eq!(h.backend.refresh_calls.load(Ordering::SeqCst), 0);
        assert!(h.events.expired());
    }

    #[tokio::test]
    async fn coordinator_fails_fast_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(TokenStore::open(dir.path().join("session.json")));
        let coordinator = RefreshCoordinator::new(
            reqwest::Client::new(),
            // port 9 is discard; any connection attempt would error, but
            // the point is that none is made
            "http://127.0.0.1:9",
            Arc::clone(&store),
        );
        let err = coordinator.refresh(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::NoRefreshToken)));
    }
}

// =============================================================================
// Terminal failures
// =============================================================================

mod terminal_failures {
    use super::*;

    #[tokio::test]
    async fn rejected_refresh_clears_session_and_signals_once() {
        let h = harness(MockBackend::new("fresh-access", "refresh-ok")).await;
        // the stored refresh token is not the one the backend accepts
        h.store.set_tokens("stale-access", "refresh-bad").unwrap();
        let mut rx = h.events.subscribe();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let client = Arc::clone(&h.client);
            handles.push(tokio::spawn(async move { client.list_tasks().await }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(err.is_terminal_auth());
        }

        // one network rejection, session gone, exactly one signal
        assert_eq!(h.backend.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(h.store.get().is_empty());
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        assert!(!rx.has_changed().unwrap());
        assert!(h.events.expired());
    }

    #[tokio::test]
    async fn transport_errors_do_not_touch_the_session() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            // nothing listens here
            api_url: "http://127.0.0.1:1".to_string(),
            session_file: dir.path().join("session.json"),
            timeout: Duration::from_secs(1),
        };
        let store = Arc::new(TokenStore::open(&config.session_file));
        store.set_tokens("access", "refresh").unwrap();
        let events = Arc::new(SessionEvents::new());
        let client =
            ApiClient::with_store(&config, Arc::clone(&store), Arc::clone(&events)).unwrap();

        let err = client.list_tasks().await.unwrap_err();
        assert!(err.is_transient());
        assert!(!events.expired());
        // the session is intact for a later retry
        assert_eq!(store.access().as_deref(), Some("access"));
    }
}

// =============================================================================
// Resource services
// =============================================================================

mod resource_services {
    use super::*;

    #[tokio::test]
    async fn snapshot_reflects_mutations_after_refetch() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;
        h.client.login("ann", "hunter2").await.unwrap();

        let service = TaskService::new(Arc::clone(&h.client));
        assert!(service.refresh().await.unwrap().is_empty());

        let created = service
            .create(&TaskDraft {
                title: "Write report".into(),
                description: None,
                status: TaskStatus::Todo,
                due_date: None,
                assigned_to: vec![2],
                group: None,
            })
            .await
            .unwrap();
        assert_eq!(service.snapshot().len(), 1);
        assert_eq!(service.snapshot()[0].title, "Write report");

        service
            .update(
                created.id,
                &TaskPatch {
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.snapshot()[0].status, TaskStatus::InProgress);

        service.delete(created.id).await.unwrap();
        assert!(service.snapshot().is_empty());
    }

    #[tokio::test]
    async fn collection_envelopes_normalize_to_plain_lists() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;
        h.client.login("ann", "hunter2").await.unwrap();

        // users come wrapped in {"users": [...]}, groups as a bare array,
        // tasks as {"results": [...]} — all decode to the same shape
        let (users, tasks, groups) = tokio::try_join!(
            h.client.list_users(),
            h.client.list_tasks(),
            h.client.list_groups()
        )
        .unwrap();
        assert_eq!(users.len(), 2);
        assert!(tasks.is_empty());
        assert_eq!(groups[0].name, "Backend");
    }

    #[tokio::test]
    async fn employee_and_manager_views_split_one_collection() {
        let h = harness(MockBackend::new("access-0", "refresh-ok")).await;
        h.client.login("ann", "hunter2").await.unwrap();

        let employees = h.client.list_employees().await.unwrap();
        let managers = h.client.list_managers().await.unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].username, "bob");
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].username, "ann");
    }
}
