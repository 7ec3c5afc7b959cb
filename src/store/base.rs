use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_store::FileTokenStore, memory_store::MemoryTokenStore};
use crate::config::StoreConfig;
use crate::error::ClientError;

/// Key under which the session token is persisted.
pub const TOKEN_KEY: &str = "jwt";

/// The TokenStore trait abstracts durable storage of the single session token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    fn get_name(&self) -> &str;
    async fn load(&self) -> Result<Option<String>, ClientError>;
    async fn save(&self, token: &str) -> Result<(), ClientError>;
    /// Removing a token that is not there is not an error.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn TokenStore> {
    match config {
        StoreConfig::File(file_config) => {
            info!(
                "Persisting session token in {}",
                file_config.path.display()
            );
            Arc::new(FileTokenStore::new(file_config.path.clone()))
        }
        StoreConfig::Memory => {
            info!("Token store is in-memory; sessions end with the process.");
            Arc::new(MemoryTokenStore::new())
        }
    }
}
