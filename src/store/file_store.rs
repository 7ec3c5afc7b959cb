use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{TokenStore, TOKEN_KEY};
use crate::error::ClientError;

/// Persists the token as a small JSON object on disk: `{"jwt": "<token>"}`.
///
/// Other keys in the file are preserved, so the file can be shared with
/// other local settings.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ClientError::Store(format!("{} is not valid JSON: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(ClientError::Store(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ClientError::Store(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            ClientError::Store(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    fn get_name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Option<String>, ClientError> {
        let mut entries = self.read_entries().await?;
        match entries.remove(TOKEN_KEY) {
            Some(Value::String(token)) if !token.is_empty() => Ok(Some(token)),
            Some(Value::String(_)) | None => Ok(None),
            Some(other) => {
                warn!("Ignoring non-string token in {}: {}", self.path.display(), other);
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &str) -> Result<(), ClientError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries).await?;
        debug!("Session token written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ClientError::Store(format!(
                        "Failed to remove {}: {}",
                        self.path.display(),
                        e
                    )))
                }
            }
        } else {
            self.write_entries(&entries).await?;
        }
        debug!("Session token removed from {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);
        // clearing an absent token is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn token_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).save("abc").await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"jwt\""));

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("abc"));

        reopened.clear().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn clear_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"jwt": "abc", "theme": "dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.clear().await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("abc"));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileTokenStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));
    }

    #[tokio::test]
    async fn structured_settings_survive_token_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"jwt": "abc", "volume": 7, "ui": {"dark": true, "langs": ["es", "en"]}}"#,
        )
        .unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().await.unwrap().as_deref(), Some("abc"));
        store.save("xyz").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("xyz"));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"volume": 7, "ui": {"dark": true, "langs": ["es", "en"]}})
        );
    }

    #[tokio::test]
    async fn non_string_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"jwt": null}"#).unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
        assert!(!path.exists());
    }
}
