// Start-up configuration, read from the environment (and `.env`, loaded in
// main before this runs).
//
// **Auth modes:**
// - Service account: `GOOGLE_SERVICE_ACCOUNT_KEY` (path) or
//   `GOOGLE_SERVICE_ACCOUNT_JSON` (content). Takes precedence when set.
// - Stored user token: `GOOGLE_OAUTH_CLIENT_ID` + `GOOGLE_OAUTH_CLIENT_SECRET`,
//   with tokens read from `DOCMCP_TOKEN_FILE` for `DOCMCP_USER_ID`.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No Google credentials configured. Set GOOGLE_SERVICE_ACCOUNT_KEY, GOOGLE_SERVICE_ACCOUNT_JSON, or GOOGLE_OAUTH_CLIENT_ID and GOOGLE_OAUTH_CLIENT_SECRET.")]
    NoCredentials,
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
    #[error("Cannot determine a token file location: set DOCMCP_TOKEN_FILE or HOME")]
    NoTokenFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAccountKey {
    KeyFile(PathBuf),
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    ServiceAccount(ServiceAccountKey),
    StoredToken {
        client_id: String,
        client_secret: String,
        token_file: PathBuf,
        user_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub auth: AuthMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var("GOOGLE_SERVICE_ACCOUNT_KEY") {
            return Ok(Self {
                auth: AuthMode::ServiceAccount(ServiceAccountKey::KeyFile(PathBuf::from(path))),
            });
        }
        if let Some(json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
            return Ok(Self {
                auth: AuthMode::ServiceAccount(ServiceAccountKey::Json(json)),
            });
        }

        let (client_id, client_secret) = match (
            var("GOOGLE_OAUTH_CLIENT_ID"),
            var("GOOGLE_OAUTH_CLIENT_SECRET"),
        ) {
            (Some(id), Some(secret)) => (id, secret),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "GOOGLE_OAUTH_CLIENT_ID",
                    "GOOGLE_OAUTH_CLIENT_SECRET",
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "GOOGLE_OAUTH_CLIENT_SECRET",
                    "GOOGLE_OAUTH_CLIENT_ID",
                ))
            }
            (None, None) => return Err(ConfigError::NoCredentials),
        };

        let token_file = match var("DOCMCP_TOKEN_FILE") {
            Some(path) => PathBuf::from(path),
            None => var("HOME")
                .map(|home| PathBuf::from(home).join(".config/gcloud/docmcp/token.json"))
                .ok_or(ConfigError::NoTokenFile)?,
        };

        Ok(Self {
            auth: AuthMode::StoredToken {
                client_id,
                client_secret,
                token_file,
                user_id: var("DOCMCP_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            },
        })
    }
}
