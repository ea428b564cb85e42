use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An OAuth access token, valid for the duration of one tool call.
///
/// The core never looks inside; it only hands the credential back to the API
/// clients. `Debug` is redacted so tokens cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(access_token.into())
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A user's OAuth tokens as persisted by a [`TokenStore`](super::TokenStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Unknown expiry is treated as still valid.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            email: None,
            name: None,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// True if the access token is expired or will be within `window`.
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expires_at| expires_at <= now + window)
            .unwrap_or(false)
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.access_token.clone())
    }
}
