// =============================================================================
// STORED USER TOKEN AUTHENTICATION
// =============================================================================
//
// Uses a user's OAuth token from a `TokenStore`. When the access token is
// about to expire and a refresh token is available, a new access token is
// obtained from the OAuth token endpoint and written back to the store.
//
// **Environment:**
// - `GOOGLE_OAUTH_CLIENT_ID` / `GOOGLE_OAUTH_CLIENT_SECRET` - OAuth client
// - `DOCMCP_TOKEN_FILE` - Where tokens are persisted
// - `DOCMCP_USER_ID` - Which stored user to act as

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;

use super::http::send_json;
use super::service_account::TokenResponse;
use crate::core::auth::{AuthError, AuthProvider, Credential, StoredToken, TokenStore};

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh when the access token expires within this window.
const REFRESH_WINDOW_SECS: i64 = 60;

pub struct StoredTokenAuth<S: TokenStore> {
    store: S,
    user_id: String,
    client_id: String,
    client_secret: String,
    token_uri: String,
    http: Client,
}

impl<S: TokenStore> StoredTokenAuth<S> {
    pub fn new(
        store: S,
        user_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            http: Client::new(),
        }
    }

    async fn refresh(&self, token: &StoredToken, refresh_token: &str) -> Result<StoredToken, AuthError> {
        tracing::info!(user_id = %self.user_id, "Refreshing OAuth access token");

        let request = self.http.post(&self.token_uri).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]);
        let response: TokenResponse = send_json(request)
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let now = Utc::now();
        let refreshed = StoredToken {
            access_token: response.access_token,
            // Google usually omits the refresh token on refresh; keep the old one.
            refresh_token: response
                .refresh_token
                .or_else(|| token.refresh_token.clone()),
            email: token.email.clone(),
            name: token.name.clone(),
            created_at: now,
            expires_at: response
                .expires_in
                .and_then(|secs| i64::try_from(secs).ok())
                .map(|secs| now + Duration::seconds(secs)),
        };

        self.store.set(&self.user_id, refreshed.clone()).await?;
        Ok(refreshed)
    }
}

#[async_trait]
impl<S: TokenStore> AuthProvider for StoredTokenAuth<S> {
    async fn credential(&self) -> Result<Credential, AuthError> {
        let token = self
            .store
            .get(&self.user_id)
            .await?
            .ok_or_else(|| AuthError::NotAuthenticated(self.user_id.clone()))?;

        if !token.expires_within(Duration::seconds(REFRESH_WINDOW_SECS), Utc::now()) {
            return Ok(token.credential());
        }

        match token.refresh_token.as_deref() {
            Some(refresh_token) => Ok(self.refresh(&token, refresh_token).await?.credential()),
            None => Err(AuthError::Exchange(format!(
                "access token for user \"{}\" expired and no refresh token is stored",
                self.user_id
            ))),
        }
    }
}
