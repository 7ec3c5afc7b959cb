use std::time::Duration;

use reqwest::Response;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::{decode_body, token_preview};
use crate::config::AuthConfig;
use crate::error::{status_fallback, ClientError};

/// Email and password, as sent to `/signup` and `/signin`.
#[derive(Serialize, Deserialize, Clone, JsonSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Passwords stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password_length", &self.password.len())
            .finish()
    }
}

/// What `/signup` and the token check echo back about the account.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// The `/signin` response.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SignInResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Client for the authentication backend, which lives apart from the
/// resource API.
#[derive(Clone, Debug)]
pub struct AuthService {
    base_url: String,
    http: reqwest::Client,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Result<Self, ClientError> {
        info!("Creating auth service for '{}'", config.base_url);
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /signup`. Returns the created account.
    pub async fn register(&self, password: &str, email: &str) -> Result<Identity, ClientError> {
        debug!(email, password_length = password.len(), "register requested");
        let response = self
            .http
            .post(self.url("/signup"))
            .json(&Credentials::new(email, password))
            .send()
            .await
            .map_err(|e| {
                error!("register request failed: {}", e);
                ClientError::from(e)
            })?;
        check_response(response).await
    }

    /// `POST /signin`. Returns the issued token.
    pub async fn login(&self, password: &str, email: &str) -> Result<SignInResponse, ClientError> {
        debug!(email, password_length = password.len(), "login requested");
        let response = self
            .http
            .post(self.url("/signin"))
            .json(&Credentials::new(email, password))
            .send()
            .await
            .map_err(|e| {
                error!("login request failed: {}", e);
                ClientError::from(e)
            })?;
        check_response(response).await
    }

    /// `GET /users/me` with the token attached, to see whether it is still live.
    pub async fn check_token(&self, token: &str) -> Result<Identity, ClientError> {
        debug!("Checking token {}", token_preview(token));
        let response = self
            .http
            .get(self.url("/users/me"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .send()
            .await?;
        check_response(response).await
    }
}

/// Pull a human readable message out of an error body: `message`, then `error`.
fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| status_fallback(status))
}

/// Shared response check: decode JSON on success, otherwise reject with the
/// server's message or `Error: <status>`.
async fn check_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return decode_body(&body);
    }

    let message = error_message(&body, status.as_u16());
    error!(status = status.as_u16(), "auth API error response: {}", message);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
