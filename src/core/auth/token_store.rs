use super::auth_models::StoredToken;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-user OAuth token storage, keyed by user id.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<StoredToken>, TokenStoreError>;
    async fn set(&self, user_id: &str, token: StoredToken) -> Result<(), TokenStoreError>;
}
