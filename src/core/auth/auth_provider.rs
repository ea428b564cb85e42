use super::auth_models::Credential;
use super::token_store::TokenStoreError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("No stored token for user \"{0}\". Authenticate first and try again.")]
    NotAuthenticated(String),
    #[error("Token exchange failed: {0}")]
    Exchange(String),
    #[error("Token store error: {0}")]
    Store(#[from] TokenStoreError),
}

/// Yields a credential for the current request. Implementations may cache or
/// refresh tokens; callers ask again for every tool call.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credential(&self) -> Result<Credential, AuthError>;
}
