// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// Signs a JWT with the service account's private key and exchanges it for an
// access token covering Docs, Sheets and Apps Script. Tokens are cached and
// reused until shortly before they expire.
//
// **Environment:**
// - `GOOGLE_SERVICE_ACCOUNT_KEY` - Path to the JSON key file
// - `GOOGLE_SERVICE_ACCOUNT_JSON` - The JSON key content (alternative)
//
// Both are read by the config layer, not here.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use super::http::send_json;
use crate::core::auth::{AuthError, AuthProvider, Credential};

pub const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/script.projects",
];

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    /// Where to exchange the JWT for an access token.
    token_uri: String,
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    /// At most one hour after `iat`.
    exp: u64,
}

/// Response from Google's token endpoint, for both JWT and refresh grants.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator that handles OAuth2 with service account credentials.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub async fn from_file(path: &str) -> Result<Self, AuthError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AuthError::MissingConfig(format!("cannot read service account key {}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| AuthError::MissingConfig(format!("invalid service account key: {}", e)))?;
        Ok(Self {
            credentials,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self.fetch_new_token().await?;
        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(3600));

        let mut cached = self.cached_token.write().await;
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: SystemTime::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });
        tracing::debug!(account = %self.credentials.client_email, "Fetched service account token");

        Ok(response.access_token)
    }

    fn signed_assertion(&self) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Exchange(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| AuthError::MissingConfig(format!("invalid private key: {}", e)))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AuthError::Exchange(e.to_string()))
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, AuthError> {
        let jwt = self.signed_assertion()?;

        let request = self.client.post(&self.credentials.token_uri).form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ]);
        send_json(request)
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for ServiceAccountAuth {
    async fn credential(&self) -> Result<Credential, AuthError> {
        Ok(Credential::new(self.get_access_token().await?))
    }
}
