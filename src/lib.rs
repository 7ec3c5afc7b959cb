//! Library exports for the Around client, shared between the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod utils;

pub use error::ClientError;
pub use session::SessionController;
