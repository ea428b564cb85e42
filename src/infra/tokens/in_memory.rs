// In-memory TokenStore. Nothing survives a restart, so it backs
// StoredTokenAuth in tests where no token file should be touched.

use crate::core::auth::{StoredToken, TokenStore, TokenStoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Maps user id -> stored token.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: DashMap<String, StoredToken>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<StoredToken>, TokenStoreError> {
        Ok(self.tokens.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn set(&self, user_id: &str, token: StoredToken) -> Result<(), TokenStoreError> {
        self.tokens.insert(user_id.to_string(), token);
        Ok(())
    }
}
