use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::models::user::AvatarUpdate;
use crate::models::{NewCard, ProfileUpdate, ServerCard, UserProfile};

/// Response bodies come either bare or wrapped once as `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Decode a JSON body, unwrapping one optional `data` envelope.
/// An empty body decodes as JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.into_inner())
}

/// First characters of a token, for logs.
pub(crate) fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(20).collect();
    format!("{}...", prefix)
}

/// Client for the resource API (profile and cards).
///
/// The client is immutable: attaching or removing a credential returns a new
/// client, so requests already in flight keep the credential they started with.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        Ok(Self::from_client(&config.base_url, builder.build()?))
    }

    /// Wrap an existing `reqwest::Client`; no credential attached.
    pub fn from_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// A copy of this client that sends `Authorization: Bearer <token>`.
    pub fn with_token(&self, token: &str) -> Self {
        debug!("API client bound to token {}", token_preview(token));
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    /// A copy of this client that sends no credential.
    pub fn without_token(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "resource API responded");
        if !status.is_success() {
            warn!(status = status.as_u16(), "resource API rejected request");
            return Err(ClientError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        decode_body(&body)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path).json(body)).await
    }

    /// `GET /users/me`
    pub async fn get_user_info(&self) -> Result<UserProfile, ClientError> {
        self.send(self.request(Method::GET, "/users/me")).await
    }

    /// `GET /cards`
    pub async fn get_initial_cards(&self) -> Result<Vec<ServerCard>, ClientError> {
        let cards: Vec<ServerCard> = self.send(self.request(Method::GET, "/cards")).await?;
        debug!("Received {} cards", cards.len());
        Ok(cards)
    }

    /// `PATCH /users/me`
    pub async fn update_user_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        self.send_json(Method::PATCH, "/users/me", update).await
    }

    /// `PATCH /users/me/avatar`
    pub async fn update_avatar(&self, avatar_url: &str) -> Result<UserProfile, ClientError> {
        let body = AvatarUpdate { avatar: avatar_url };
        self.send_json(Method::PATCH, "/users/me/avatar", &body)
            .await
    }

    /// `POST /cards`
    pub async fn create_card(&self, card: &NewCard) -> Result<ServerCard, ClientError> {
        self.send_json(Method::POST, "/cards", card).await
    }

    /// `PUT /cards/{id}/likes` to like, `DELETE /cards/{id}/likes` to unlike.
    pub async fn change_like_status(
        &self,
        card_id: &str,
        like: bool,
    ) -> Result<ServerCard, ClientError> {
        let method = if like { Method::PUT } else { Method::DELETE };
        self.send(self.request(method, &format!("/cards/{}/likes", card_id)))
            .await
    }

    /// `DELETE /cards/{id}`. Whatever the server answers with is passed through.
    pub async fn delete_card(&self, card_id: &str) -> Result<Value, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/cards/{}", card_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.url(),
            timeout_in_ms: Some(5_000),
        })
        .unwrap()
    }

    #[test]
    fn envelope_is_optional() {
        let wrapped: Vec<u32> = decode_body(r#"{"data": [1, 2]}"#).unwrap();
        let bare: Vec<u32> = decode_body("[1, 2]").unwrap();
        assert_eq!(wrapped, bare);
        let empty: Value = decode_body("").unwrap();
        assert_eq!(empty, Value::Null);
    }

    #[test]
    fn token_changes_do_not_touch_the_original() {
        let base = ApiClient::from_client("http://x/v1/", reqwest::Client::new());
        let authed = base.with_token("abc");
        assert_eq!(base.token(), None);
        assert_eq!(authed.token(), Some("abc"));
        assert_eq!(authed.without_token().token(), None);
        assert_eq!(authed.base_url(), "http://x/v1");
    }

    /// Test that the bearer token is attached and an enveloped profile is unwrapped.
    #[tokio::test]
    async fn test_get_user_info_unwraps_envelope() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer abc")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"_id": "u1", "email": "a@b.c"}}"#)
            .create_async()
            .await;

        let profile = client_for(&server)
            .with_token("abc")
            .get_user_info()
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.email, "a@b.c");
        assert_eq!(profile.name, "Usuario");
    }

    /// Test that no authorization header is sent by a client without a token.
    #[tokio::test]
    async fn test_unauthenticated_client_sends_no_credential() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cards")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let cards = client_for(&server).get_initial_cards().await.unwrap();
        m.assert_async().await;
        assert!(cards.is_empty());
    }

    /// Test that a non-2xx status becomes `Error: <status>` regardless of the body.
    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/cards/c1")
            .with_status(403)
            .with_body(r#"{"message": "not yours"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .with_token("abc")
            .delete_card("c1")
            .await
            .unwrap_err();
        m.assert_async().await;
        assert_eq!(err.to_string(), "Error: 403");
        assert_eq!(err.status(), Some(403));
    }

    /// Test that liking uses PUT and unliking uses DELETE on the likes resource.
    #[tokio::test]
    async fn test_like_method_follows_requested_state() {
        let mut server = Server::new_async().await;
        let body = r#"{"_id": "c1", "name": "Lake", "link": "http://x/l.png", "isLiked": true}"#;
        let put = server
            .mock("PUT", "/cards/c1/likes")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/cards/c1/likes")
            .with_status(200)
            .with_body(r#"{"data": {"_id": "c1", "name": "Lake", "link": "http://x/l.png"}}"#)
            .create_async()
            .await;

        let client = client_for(&server).with_token("abc");
        let liked = client.change_like_status("c1", true).await.unwrap();
        let unliked = client.change_like_status("c1", false).await.unwrap();
        put.assert_async().await;
        delete.assert_async().await;
        assert_eq!(liked.is_liked, Some(true));
        assert_eq!(unliked.id, "c1");
    }

    /// Test that the card creation body carries name and link.
    #[tokio::test]
    async fn test_create_card_posts_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/cards")
            .match_body(Matcher::Json(serde_json::json!({
                "name": "Peak",
                "link": "http://x/img.png"
            })))
            .with_status(201)
            .with_body(r#"{"_id": "c9", "name": "Peak", "link": "http://x/img.png", "owner": "u1"}"#)
            .create_async()
            .await;

        let card = client_for(&server)
            .with_token("abc")
            .create_card(&NewCard {
                name: "Peak".to_string(),
                link: "http://x/img.png".to_string(),
            })
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(card.id, "c9");
    }

    /// Test that the avatar update sends `{avatar}`.
    #[tokio::test]
    async fn test_update_avatar_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/users/me/avatar")
            .match_body(Matcher::Json(serde_json::json!({"avatar": "http://x/a.png"})))
            .with_status(200)
            .with_body(r#"{"_id": "u1", "name": "Ann", "about": "Hi", "avatar": "http://x/a.png"}"#)
            .create_async()
            .await;

        let profile = client_for(&server)
            .with_token("abc")
            .update_avatar("http://x/a.png")
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(profile.avatar_url, "http://x/a.png");
    }
}
