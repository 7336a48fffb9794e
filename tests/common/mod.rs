//! Shared utilities for integration testing.
//!
//! `FakeBackend` is a programmable in-memory stand-in for the
//! certificate-management service. It counts every call as `"METHOD /endpoint"`
//! and can be told to answer any such key with a fixed status.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use certgate::config::GatewayConfig;
use certgate::lifecycle::build_state;
use certgate::upstream::types::{CertRecord, EventRecord, NewCert, Settings};

pub const ADMIN: &str = "admin@example.com";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const GUEST: &str = "guest@partner.test";
pub const STRANGER: &str = "mallory@evil.test";

/// Expiry the fake backend stamps on newly issued certificates.
pub const ISSUED_EXPIRES: &str = "2030-06-15T12:00:00Z";

#[derive(Debug, Default)]
pub struct BackendState {
    pub settings: Settings,
    pub whitelist: Vec<String>,
    /// Certificates keyed by fingerprint.
    pub certs: BTreeMap<String, CertRecord>,
    /// TOTP seed URL per enrolled email.
    pub totp: BTreeMap<String, String>,
    pub events: Vec<EventRecord>,
    pub calls: HashMap<String, usize>,
    pub forced: HashMap<String, u16>,
    pub delays: HashMap<String, Duration>,
    pub last_events_query: Option<String>,
    /// Report this owner in every certificate listing, whoever was asked for.
    pub listing_owner_override: Option<String>,
    next_serial: u32,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState {
            settings: Settings {
                service_name: "Test VPN".into(),
                client_limit: 2,
                issued_cert_duration: 90,
                whitelisted_domains: vec!["example.com".into()],
                whitelisted_users: vec![GUEST.into()],
            },
            whitelist: vec![GUEST.into()],
            ..Default::default()
        }));

        let app = Router::new()
            .route("/settings", routing::get(get_settings).put(put_settings))
            .route("/whitelist", routing::get(get_whitelist))
            .route(
                "/whitelist/{email}",
                routing::put(add_whitelist).delete(remove_whitelist),
            )
            .route("/users", routing::get(list_users))
            .route(
                "/user/{email}",
                routing::get(get_user).put(enroll_user).delete(delete_user),
            )
            .route("/certs/{email}", routing::get(list_certs).post(create_cert))
            .route("/cert/{fingerprint}", routing::get(get_cert).delete(revoke_cert))
            .route("/events", routing::get(list_events))
            .layer(middleware::from_fn_with_state(state.clone(), count_and_force))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Number of calls recorded for a key such as `"POST /certs"`.
    pub fn calls(&self, key: &str) -> usize {
        self.state().calls.get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Answer every `key` call with `status` and an empty body.
    pub fn force(&self, key: &str, status: u16) {
        self.state().forced.insert(key.to_string(), status);
    }

    /// Hold every `key` call for `delay` before answering it.
    pub fn delay(&self, key: &str, delay: Duration) {
        self.state().delays.insert(key.to_string(), delay);
    }

    pub fn add_cert(&self, owner: &str, fingerprint: &str, expires: &str, revoked: bool) {
        let record = CertRecord {
            email: owner.into(),
            fingerprint: fingerprint.into(),
            description: format!("{owner} device"),
            created: "2024-01-01T00:00:00Z".into(),
            expires: expires.into(),
            revoked: if revoked { "2024-02-01T00:00:00Z".into() } else { String::new() },
        };
        self.state().certs.insert(fingerprint.to_string(), record);
    }

    pub fn is_revoked(&self, fingerprint: &str) -> bool {
        self.state().certs.get(fingerprint).is_some_and(CertRecord::is_revoked)
    }
}

type Shared = State<Arc<Mutex<BackendState>>>;

async fn count_and_force(State(state): Shared, request: Request, next: Next) -> Response {
    let endpoint = request.uri().path().split('/').nth(1).unwrap_or_default();
    let key = format!("{} /{}", request.method(), endpoint);

    let (forced, delay) = {
        let mut state = state.lock().unwrap();
        *state.calls.entry(key.clone()).or_default() += 1;
        (state.forced.get(&key).copied(), state.delays.get(&key).copied())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match forced {
        Some(status) => StatusCode::from_u16(status).unwrap().into_response(),
        None => next.run(request).await,
    }
}

fn summary(record: &CertRecord) -> Value {
    json!({
        "Fingerprint": record.fingerprint,
        "Description": record.description,
        "Expires": record.expires,
    })
}

async fn get_settings(State(state): Shared) -> Json<Settings> {
    Json(state.lock().unwrap().settings.clone())
}

/// Decodes onto the current settings: keys missing from the body keep their value.
async fn put_settings(State(state): Shared, Json(update): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let mut merged = serde_json::to_value(&state.settings).unwrap();
    let (Some(merged_fields), Some(update_fields)) = (merged.as_object_mut(), update.as_object())
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    for (key, value) in update_fields {
        merged_fields.insert(key.clone(), value.clone());
    }
    state.settings = serde_json::from_value(merged).unwrap();
    Json(state.settings.clone()).into_response()
}

async fn get_whitelist(State(state): Shared) -> Json<Value> {
    Json(json!({ "Users": state.lock().unwrap().whitelist }))
}

async fn add_whitelist(State(state): Shared, Path(email): Path<String>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    if !state.whitelist.contains(&email) {
        state.whitelist.push(email);
    }
    Json(json!({ "Users": state.whitelist }))
}

async fn remove_whitelist(State(state): Shared, Path(email): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    if !state.whitelist.contains(&email) {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.whitelist.retain(|user| *user != email);
    Json(json!({ "Users": state.whitelist })).into_response()
}

async fn list_users(State(state): Shared) -> Response {
    let state = state.lock().unwrap();
    if state.certs.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut counts: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for record in state.certs.values() {
        let entry = counts.entry(record.email.as_str()).or_default();
        if record.is_revoked() {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }
    let users: Vec<Value> = counts
        .into_iter()
        .map(|(email, (active, inactive))| {
            json!({ "Email": email, "ActiveCerts": active, "InactiveCerts": inactive })
        })
        .collect();
    Json(json!({ "Users": users })).into_response()
}

async fn get_user(State(state): Shared, Path(email): Path<String>) -> Response {
    let state = state.lock().unwrap();
    let active: Vec<Value> = state
        .certs
        .values()
        .filter(|record| record.email == email && !record.is_revoked())
        .map(summary)
        .collect();
    let totp = state.totp.get(&email);
    if totp.is_none() && active.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "Email": email,
        "Created": "2024-01-01T00:00:00Z",
        "ActiveCerts": active,
        "TOTPURL": totp,
    }))
    .into_response()
}

async fn enroll_user(State(state): Shared, Path(email): Path<String>) -> Json<Value> {
    let url = format!("otpauth://totp/{email}?secret=TESTSEED");
    state.lock().unwrap().totp.insert(email.clone(), url.clone());
    Json(json!({ "Email": email, "TOTPURL": url }))
}

async fn delete_user(State(state): Shared, Path(email): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let known = state.totp.remove(&email).is_some()
        | state.certs.values().any(|record| record.email == email);
    if !known {
        return StatusCode::NOT_FOUND.into_response();
    }
    for record in state.certs.values_mut().filter(|record| record.email == email) {
        if !record.is_revoked() {
            record.revoked = "2024-03-01T00:00:00Z".into();
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_certs(State(state): Shared, Path(email): Path<String>) -> Response {
    let state = state.lock().unwrap();
    let owned: Vec<&CertRecord> = state
        .certs
        .values()
        .filter(|record| record.email == email)
        .collect();
    if owned.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let (revoked, active): (Vec<&CertRecord>, Vec<&CertRecord>) =
        owned.into_iter().partition(|record| record.is_revoked());
    let owner = state.listing_owner_override.clone().unwrap_or(email);
    let active: Vec<Value> = active.into_iter().map(summary).collect();
    // The real backend sends null for an empty list.
    let revoked: Value = if revoked.is_empty() {
        Value::Null
    } else {
        revoked.into_iter().map(summary).collect()
    };
    Json(json!({
        "Email": owner,
        "Created": "2024-01-01T00:00:00Z",
        "ActiveCerts": active,
        "RevokedCerts": revoked,
    }))
    .into_response()
}

async fn create_cert(
    State(state): Shared,
    Path(email): Path<String>,
    Json(request): Json<NewCert>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.next_serial += 1;
    let fingerprint = format!("fp-{:04}", state.next_serial);
    state.certs.insert(
        fingerprint.clone(),
        CertRecord {
            email: email.clone(),
            fingerprint,
            description: request.description,
            created: "2024-01-01T00:00:00Z".into(),
            expires: ISSUED_EXPIRES.into(),
            revoked: String::new(),
        },
    );
    Json(json!({ "OVPNDataURL": format!("data:application/x-openvpn-profile;base64,{email}") }))
}

async fn get_cert(State(state): Shared, Path(fingerprint): Path<String>) -> Response {
    match state.lock().unwrap().certs.get(&fingerprint) {
        Some(record) => Json(record.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn revoke_cert(State(state): Shared, Path(fingerprint): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    match state.certs.get_mut(&fingerprint) {
        Some(record) => {
            record.revoked = "2024-03-01T00:00:00Z".into();
            Json(record.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct EventsParams {
    before: Option<String>,
}

async fn list_events(State(state): Shared, Query(params): Query<EventsParams>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.last_events_query = params.before;
    Json(json!({ "Events": state.events }))
}

/// Gateway configuration pointed at a fake backend.
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig {
        admin_users: vec![ADMIN.into()],
        ..Default::default()
    };
    config.backend.base_url = format!("http://{backend}/");
    config.backend.system_proxy = false;
    config.backend.timeout_secs = 5;
    config
}

/// Gateway router wired to a fake backend, ready for `oneshot`.
pub fn gateway(backend: &FakeBackend) -> Router {
    gateway_with(gateway_config(backend.addr))
}

pub fn gateway_with(config: GatewayConfig) -> Router {
    let state = build_state(Arc::new(config)).unwrap();
    certgate::build_router(state)
}

/// Response status, headers and JSON body (`Null` when empty).
pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Send one request through the gateway as `user` (anonymous when `None`).
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<&str>,
) -> Reply {
    let mut request = axum::http::Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("x-forwarded-email", user);
    }
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map_or_else(Body::empty, |text| Body::from(text.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    Reply { status, headers, body }
}

pub async fn get(app: &Router, uri: &str, user: &str) -> Reply {
    call(app, Method::GET, uri, Some(user), None).await
}

/// The `Error.Message` of an envelope, or `""`.
pub fn error_message(reply: &Reply) -> &str {
    reply.body["Error"]["Message"].as_str().unwrap_or_default()
}
