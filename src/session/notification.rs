use serde::Serialize;

const SUCCESS_MESSAGE: &str = "¡Correcto! Ya estás registrado.";
const FAILURE_MESSAGE: &str = "Uy, algo salió mal. Por favor, inténtalo de nuevo.";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// A transient message raised by sign-up and sign-in outcomes.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Extra context, e.g. the server's reason for a failure.
    pub detail: Option<String>,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            kind: NotificationKind::Success,
            detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            NotificationKind::Success => SUCCESS_MESSAGE,
            NotificationKind::Failure => FAILURE_MESSAGE,
        }
    }
}
