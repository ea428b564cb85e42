pub mod auth_models;
pub mod auth_provider;
pub mod token_store;

pub use auth_models::{Credential, StoredToken};
pub use auth_provider::{AuthError, AuthProvider};
pub use token_store::{TokenStore, TokenStoreError};
