use std::sync::Mutex;

use async_trait::async_trait;

use super::TokenStore;
use crate::error::ClientError;

/// A process-local store, used for ephemeral sessions and in tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a token, as if persisted by an earlier run.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// Synchronous peek at the stored token.
    pub fn current(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, ClientError> {
        self.token
            .lock()
            .map_err(|_| ClientError::Store("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("abc").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.current(), None);
    }
}
