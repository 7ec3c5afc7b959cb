//! Client-side session: authentication state, the card feed and the user profile.

pub mod controller;
pub mod notification;
pub mod route;
pub mod state;
pub mod user_context;

pub use controller::SessionController;
pub use notification::{Notification, NotificationKind};
pub use route::Route;
pub use state::{AuthenticatedSession, SessionState};
pub use user_context::UserContext;
