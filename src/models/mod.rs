pub mod card;
pub mod user;

// Re-export the data types so callers can do "use crate::models::{Card, UserProfile};"
pub use card::{Card, NewCard, ServerCard, UserRef};
pub use user::{ProfileUpdate, UserProfile};
