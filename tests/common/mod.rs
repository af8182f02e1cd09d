// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use viewza::config::Config;
use viewza::crypto::{b64url_encode, raw_public_key};
use viewza::db::FirestoreDb;
use viewza::models::{SubscriptionInfo, SubscriptionKeys};
use viewza::routes::create_router;
use viewza::services::{PushService, PushSettings, VapidKeyManager};
use viewza::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::default(), FirestoreDb::new_in_memory())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Identity token for `user_id`, signed with the test config's key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    viewza::middleware::auth::create_jwt(user_id, &Config::default().auth_jwt_secret)
        .expect("Failed to sign test token")
}

/// A browser-shaped subscription with valid key sizes.
#[allow(dead_code)]
pub fn sample_subscription(endpoint: &str) -> SubscriptionInfo {
    let secret = p256::SecretKey::random(&mut rand_core::OsRng);
    SubscriptionInfo {
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: b64url_encode(&raw_public_key(&secret.public_key())),
            auth: b64url_encode(&[7u8; 16]),
        },
    }
}

/// How a mock push service answers.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum MockBehavior {
    Respond(StatusCode),
    /// Hold the request open before answering 201
    Stall(Duration),
}

/// One request seen by a mock push service.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedPush {
    pub path: String,
    pub host: Option<String>,
    pub authorization: Option<String>,
    pub ttl: Option<String>,
    pub content_length: Option<String>,
    pub body_len: usize,
}

#[derive(Clone)]
struct MockState {
    behavior: MockBehavior,
    requests: Arc<Mutex<Vec<RecordedPush>>>,
}

/// A push service listening on 127.0.0.1.
#[allow(dead_code)]
pub struct MockPushServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedPush>>>,
}

#[allow(dead_code)]
impl MockPushServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behavior,
            requests: requests.clone(),
        };

        let app = axum::Router::new().fallback(record_push).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock push server");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, requests }
    }

    /// Endpoint URL on `host`, which must be resolved to this server.
    pub fn endpoint(&self, host: &str, path: &str) -> String {
        format!("http://{}:{}{}", host, self.addr.port(), path)
    }

    pub fn recorded(&self) -> Vec<RecordedPush> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record_push(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedPush {
        path: uri.path().to_string(),
        host: header_value(header::HOST.as_str()),
        authorization: header_value(header::AUTHORIZATION.as_str()),
        ttl: header_value("ttl"),
        content_length: header_value(header::CONTENT_LENGTH.as_str()),
        body_len: body.len(),
    });

    match state.behavior {
        MockBehavior::Respond(status) => status,
        MockBehavior::Stall(delay) => {
            tokio::time::sleep(delay).await;
            StatusCode::CREATED
        }
    }
}

/// Push service whose HTTP client resolves `hosts` to local mock servers.
#[allow(dead_code)]
pub fn push_service_with_hosts(
    db: FirestoreDb,
    settings: PushSettings,
    hosts: &[(&str, SocketAddr)],
) -> PushService {
    let mut builder = reqwest::Client::builder();
    for (host, addr) in hosts {
        builder = builder.resolve(host, *addr);
    }
    let http = builder.build().expect("Failed to build HTTP client");

    let vapid = Arc::new(VapidKeyManager::new(
        db.clone(),
        "mailto:test@viewza.app",
    ));
    PushService::with_http_client(db, vapid, http, settings)
}

#[allow(dead_code)]
pub fn test_push_settings() -> PushSettings {
    PushSettings {
        ttl_secs: 86_400,
        timeout: Duration::from_secs(5),
        concurrency: 4,
    }
}
