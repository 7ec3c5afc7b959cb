#![allow(dead_code)]

use std::sync::Arc;

use around_client::api::ApiClient;
use around_client::auth::AuthService;
use around_client::config::{ApiConfig, AuthConfig};
use around_client::store::{MemoryTokenStore, TokenStore};
use around_client::SessionController;
use mockito::{Mock, Server, ServerGuard};

pub const PROFILE: &str = r#"{
    "_id": "u1",
    "email": "ann@example.com",
    "name": "Ann",
    "about": "Hiker",
    "avatar": "http://x/ann.png"
}"#;

/// Three cards, newest first. Only `c2` is liked by `u1`.
pub const CARDS: &str = r#"{"data": [
    {"_id": "c1", "name": "Lake", "link": "http://x/lake.png", "owner": "u2", "likes": [],
     "createdAt": "2024-03-03T10:00:00.000Z"},
    {"_id": "c2", "name": "Forest", "link": "http://x/forest.png", "owner": {"_id": "u1"},
     "likes": [{"_id": "u1"}, {"_id": "u3"}], "createdAt": "2024-03-02T10:00:00.000Z"},
    {"_id": "c3", "name": "Dunes", "link": "http://x/dunes.png", "owner": "u3", "likes": ["u3"],
     "createdAt": "2024-03-01T10:00:00.000Z"}
]}"#;

/// The resource API and the auth API run on separate mock servers.
pub struct Backends {
    pub api: ServerGuard,
    pub auth: ServerGuard,
    /// Fixture mocks are held here so they stay registered for the whole test.
    pub fixtures: Vec<Mock>,
}

pub async fn backends() -> Backends {
    Backends {
        api: Server::new_async().await,
        auth: Server::new_async().await,
        fixtures: Vec::new(),
    }
}

pub fn controller(backends: &Backends, store: Arc<MemoryTokenStore>) -> SessionController {
    let api = ApiClient::new(&ApiConfig {
        base_url: backends.api.url(),
        timeout_in_ms: Some(5_000),
    })
    .expect("api client should build");
    let auth = AuthService::new(&AuthConfig {
        base_url: backends.auth.url(),
        timeout_in_ms: Some(5_000),
    })
    .expect("auth service should build");
    SessionController::from_parts(api, auth, store as Arc<dyn TokenStore>)
}

pub async fn mock_token_check(auth: &mut ServerGuard, token: &str, status: usize) -> Mock {
    let body = if status == 200 {
        r#"{"data": {"_id": "u1", "email": "ann@example.com"}}"#
    } else {
        r#"{"message": "Invalid token"}"#
    };
    auth.mock("GET", "/users/me")
        .match_header("authorization", format!("Bearer {}", token).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Profile and cards as fetched right after authentication.
pub async fn mock_session_load(api: &mut ServerGuard, token: &str) -> (Mock, Mock) {
    let bearer = format!("Bearer {}", token);
    let profile = api
        .mock("GET", "/users/me")
        .match_header("authorization", bearer.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PROFILE)
        .create_async()
        .await;
    let cards = api
        .mock("GET", "/cards")
        .match_header("authorization", bearer.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CARDS)
        .create_async()
        .await;
    (profile, cards)
}

/// A controller restored from a persisted, valid token `abc`.
pub async fn signed_in(backends: &mut Backends) -> (SessionController, Arc<MemoryTokenStore>) {
    let check = mock_token_check(&mut backends.auth, "abc", 200).await;
    let (profile, cards) = mock_session_load(&mut backends.api, "abc").await;
    backends.fixtures.extend([check, profile, cards]);

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let mut controller = controller(backends, store.clone());
    controller.initialize().await;
    assert!(controller.is_authenticated(), "fixture session should be live");
    (controller, store)
}
