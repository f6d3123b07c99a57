//! Stub back-office backend for integration tests
//!
//! Serves a fixed casino (id 7) on a random local port and records every
//! request it receives. The bearer token `expired` is answered with `401`.

#![allow(dead_code)]

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use casino_desk::{
    api::{BackofficeApi, BaseClient, QueryCache, Session, TokenStore},
    notify::MemoryNotifier,
};
use serde_json::{json, Value};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tempfile::TempDir;
use url::Url;

/// 1x1 transparent PNG
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00,
    0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
    0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D,
    0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
pub struct StubState {
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub bonuses: Mutex<Vec<Value>>,
}

impl StubState {
    /// Number of requests received for `method path`
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

pub struct TestContext {
    pub state: Arc<StubState>,
    pub addr: SocketAddr,
    pub api: BackofficeApi,
    pub notifier: Arc<MemoryNotifier>,
    pub token_dir: TempDir,
    server_handle: tokio::task::JoinHandle<()>,
}

impl TestContext {
    /// Start the stub backend and a signed-in client pointed at it
    pub async fn new(token: &str) -> Self {
        let state = Arc::new(StubState::default());
        *state.bonuses.lock().unwrap() = vec![
            json!({"id": 1, "casino_id": 7, "name": "Welcome", "geo": "RU", "kind": "deposit",
                   "bonus_type": "cash", "category": "casino", "min_deposit": 20, "max_bonus": 500,
                   "wager": 35, "currency": "EUR"}),
            json!({"id": 2, "casino_id": 7, "name": "Spins", "geo": "DE", "kind": "no_deposit",
                   "bonus_type": "freespin", "category": "casino", "freespins": 50}),
        ];

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let router = router(state.clone());
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let token_dir = tempfile::tempdir().unwrap();
        let session = Arc::new(Session::anonymous(TokenStore::new(token_dir.path().join("token"))));
        session.login(token).unwrap();

        let notifier = Arc::new(MemoryNotifier::new());
        let client = BaseClient::new(
            Url::parse(&format!("http://{}/api/", addr)).unwrap(),
            Duration::from_secs(5),
            session,
            notifier.clone(),
        )
        .unwrap();
        let cache = Arc::new(QueryCache::new(64, Duration::from_secs(60)));

        Self {
            state,
            addr,
            api: BackofficeApi::new(client, cache),
            notifier,
            token_dir,
            server_handle,
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/casinos", get(list_casinos))
        .route("/api/casinos/:id", get(get_casino))
        .route("/api/profile-fields", get(list_profile_fields))
        .route("/api/casinos/:id/profile", get(get_profile_values))
        .route("/api/profile-contexts", get(list_profile_contexts))
        .route("/api/casinos/:id/profile-settings", get(get_profile_settings))
        .route("/api/casinos/:id/bonuses", get(list_bonuses).post(create_bonus))
        .route("/api/bonuses/:id/images", get(list_bonus_images))
        .route("/api/casinos/:id/payments", get(list_payments))
        .route("/api/payments/:id/images", get(list_payment_images))
        .route("/api/casinos/:id/promos", get(empty_list))
        .route("/api/promos/:id", delete(delete_promo))
        .route("/api/emails", get(list_emails))
        .route("/api/casinos/:id/comments", get(list_comments))
        .route("/uploads/:name", get(upload))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
        .with_state(state)
}

async fn record_and_authorize(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    // owned copies only, the request body must not be borrowed across the await
    let recorded = {
        let header_value = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_value(header::AUTHORIZATION.as_str()),
            request_id: header_value("x-request-id"),
        }
    };
    let expired = recorded.authorization.as_deref() == Some("Bearer expired");
    state.requests.lock().unwrap().push(recorded);

    if expired {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token expired"}))).into_response();
    }
    next.run(request).await
}

fn casino() -> Value {
    json!({"id": 7, "name": "Lucky Star", "website": "https://luckystar.example", "status": "active", "geos": ["DE"]})
}

async fn list_casinos() -> Json<Value> {
    Json(json!([casino()]))
}

async fn get_casino(Path(id): Path<i64>) -> Response {
    if id == 7 {
        Json(casino()).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"error": "Casino not found"}))).into_response()
    }
}

async fn list_profile_fields() -> Json<Value> {
    Json(json!([
        {"id": 2, "key": "support", "label": "Support hours", "sort_order": 2},
        {"id": 1, "key": "license", "label": "License", "sort_order": 1}
    ]))
}

async fn get_profile_values(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 1, "casino_id": 7, "field_id": 1, "value": "Curacao"}]))
}

async fn list_profile_contexts() -> Json<Value> {
    Json(json!([{"id": 1, "name": "Website", "sort_order": 0}]))
}

async fn get_profile_settings(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 1, "casino_id": 7, "field_id": 1, "context_id": 1, "geo": "FI", "value": true}]))
}

async fn list_bonuses(State(state): State<Arc<StubState>>, Path(_id): Path<i64>) -> Json<Value> {
    // slow enough for concurrent callers to overlap
    tokio::time::sleep(Duration::from_millis(50)).await;
    Json(Value::Array(state.bonuses.lock().unwrap().clone()))
}

async fn create_bonus(
    State(state): State<Arc<StubState>>,
    Path(casino_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if body["name"] == "Duplicate" {
        let errors = json!({"message": "Validation failed", "errors": {"name": ["Name already exists"]}});
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response();
    }

    let mut bonuses = state.bonuses.lock().unwrap();
    let mut bonus = body;
    bonus["id"] = json!(bonuses.len() + 1);
    bonus["casino_id"] = json!(casino_id);
    bonuses.push(bonus.clone());
    (StatusCode::CREATED, Json(bonus)).into_response()
}

async fn list_bonus_images(Path(id): Path<i64>) -> Json<Value> {
    match id {
        1 => Json(json!([{"id": 1, "owner_id": 1, "url": "/uploads/shared.png"}])),
        2 => Json(json!([
            {"id": 2, "owner_id": 2, "url": "/uploads/shared.png"},
            {"id": 3, "owner_id": 2, "url": "/uploads/missing.png"}
        ])),
        _ => Json(json!([])),
    }
}

async fn list_payments(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([
        {"id": 10, "casino_id": 7, "geo": "PL", "direction": "withdrawal", "method": "Skrill",
         "min_amount": 10, "max_amount": 2500.5, "currency": "EUR"}
    ]))
}

async fn list_payment_images(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 4, "owner_id": 10, "url": "/uploads/shared.png"}]))
}

async fn empty_list() -> Json<Value> {
    Json(json!([]))
}

async fn delete_promo(Path(_id): Path<i64>) -> Response {
    (StatusCode::CONFLICT, Json(json!({"message": "Promo is locked"}))).into_response()
}

async fn list_emails() -> Json<Value> {
    Json(json!([
        {"id": 1, "casino_id": 7, "sender": "vip@luckystar.example", "recipient": "ops@desk.example",
         "subject": "Welcome", "body_html": "<p>Hello <b>team</b></p>"},
        {"id": 2, "casino_id": 7, "sender": "kyc@luckystar.example", "recipient": "alerts@desk.example",
         "subject": "KYC", "body_html": "<p>Documents</p>"},
        {"id": 3, "casino_id": 7, "sender": "vip@luckystar.example", "recipient": "ops@desk.example",
         "subject": "Reminder"}
    ]))
}

async fn list_comments(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([
        {"id": 1, "casino_id": 7, "author": "anna", "text_html": "<ul><li>fast KYC</li></ul>",
         "tags": [{"id": 1, "name": "kyc"}], "images": ["/uploads/shared.png"]}
    ]))
}

async fn upload(Path(name): Path<String>) -> Response {
    if name == "shared.png" {
        ([(header::CONTENT_TYPE, "image/png")], PIXEL_PNG).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
