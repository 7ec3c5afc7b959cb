//! Error type shared by the resource client, the auth service and the session controller.

use thiserror::Error;

/// Everything that can go wrong while talking to the backends or managing the session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, timeout...).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-2xx response from the resource API. The body is not inspected.
    #[error("Error: {0}")]
    Status(u16),

    /// A non-2xx response from the auth API, with the best message we could extract.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A sign-in response succeeded but carried no token.
    #[error("Sign-in response did not contain a token")]
    MissingToken,

    /// A resource mutation was attempted without an authenticated session.
    #[error("No authenticated session")]
    NotAuthenticated,

    /// The card id is not part of the current card list.
    #[error("Card '{0}' is not in the current list")]
    CardNotFound(String),

    /// The token store failed to read or write the persisted token.
    #[error("Token store error: {0}")]
    Store(String),
}

impl ClientError {
    /// HTTP status behind this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status(status) => Some(*status),
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text suitable for showing to a person.
    ///
    /// Server supplied messages win; otherwise well known statuses get a fixed
    /// description and everything else falls back to the `Display` output.
    pub fn user_message(&self) -> String {
        if let ClientError::Server { status, message } = self {
            if *message != status_fallback(*status) {
                return message.clone();
            }
        }

        match self.status() {
            Some(400) => "Los datos proporcionados son incorrectos".to_string(),
            Some(401) => "Credenciales inválidas".to_string(),
            Some(403) => "No tienes permisos para realizar esta acción".to_string(),
            Some(404) => "El recurso solicitado no fue encontrado".to_string(),
            Some(500) => "Error interno del servidor".to_string(),
            _ => self.to_string(),
        }
    }
}

/// The generic `Error: <status>` text used when a response carries no message.
pub fn status_fallback(status: u16) -> String {
    format!("Error: {}", status)
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
