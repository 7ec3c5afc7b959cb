pub mod client;

// Re-export from client.rs so we can do "use crate::api::ApiClient;"
pub use client::ApiClient;
pub(crate) use client::{decode_body, token_preview};
