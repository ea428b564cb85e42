use crate::core::auth::{StoredToken, TokenStore, TokenStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// JSON-file token store. All users live in one file:
/// { "users": { user_id: StoredToken } }
#[derive(Debug, Serialize, Deserialize, Default)]
struct TokenFileData {
    #[serde(default)]
    users: HashMap<String, StoredToken>,
}

pub struct JsonTokenStore {
    path: PathBuf,
    cache: RwLock<TokenFileData>,
}

impl JsonTokenStore {
    /// Load the file if it exists. A missing file is an empty store; a
    /// corrupt one is an error so tokens are never silently overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let path = path.into();
        let cache = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            TokenFileData::default()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), TokenStoreError> {
        let cache = self.cache.read().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = create_owner_only(&self.path)?;
        restrict_permissions(&self.path)?;
        serde_json::to_writer_pretty(file, &*cache)?;
        Ok(())
    }
}

/// Tokens are secrets: a new file is owner read/write from the moment it
/// exists.
#[cfg(unix)]
fn create_owner_only(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_owner_only(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

/// The creation mode only applies to new files; an existing one is narrowed here.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl TokenStore for JsonTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<StoredToken>, TokenStoreError> {
        let cache = self.cache.read().await;
        Ok(cache.users.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, token: StoredToken) -> Result<(), TokenStoreError> {
        let mut cache = self.cache.write().await;
        cache.users.insert(user_id.to_string(), token);
        drop(cache);
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_json_persistence_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_owned();
        drop(tmp);

        let store = JsonTokenStore::open(path.clone()).unwrap();
        let mut token = StoredToken::new("ya29.a", Some("1//r".to_string()));
        token.email = Some("alice@example.com".to_string());
        store.set("alice", token.clone()).await.unwrap();

        // Reload from file
        let store2 = JsonTokenStore::open(path.clone()).unwrap();
        assert_eq!(store2.get("alice").await.unwrap(), Some(token));
        assert_eq!(store2.get("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/docmcp/token.json");

        let store = JsonTokenStore::open(path.clone()).unwrap();
        store
            .set("default", StoredToken::new("ya29.b", None))
            .await
            .unwrap();

        assert!(path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        let store = JsonTokenStore::open(path.clone()).unwrap();
        store
            .set("default", StoredToken::new("ya29.c", None))
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_token_file_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        let _file = create_owner_only(&path).unwrap();

        // Checked before anything is written or re-chmodded.
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_wide_token_file_is_narrowed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = JsonTokenStore::open(path.clone()).unwrap();
        store
            .set("default", StoredToken::new("ya29.d", None))
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not json").unwrap();

        let err = JsonTokenStore::open(tmp.path()).err().unwrap();
        assert!(matches!(err, TokenStoreError::Serialization(_)));
    }
}
