// =============================================================================
// APPS SCRIPT CLIENT
// =============================================================================
//
// `projects.getContent` / `projects.updateContent`. The update replaces the
// whole project, so callers always send every file.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::http::{send, send_json};
use crate::core::auth::Credential;
use crate::core::editing::ApiError;
use crate::core::scripts::{ScriptFile, ScriptProject, ScriptsApi};

const SCRIPT_API_BASE: &str = "https://script.googleapis.com";

pub struct GoogleScriptsClient {
    client: Client,
    base_url: String,
}

impl GoogleScriptsClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: SCRIPT_API_BASE.to_string(),
        }
    }

    fn content_url(&self, script_id: &str) -> String {
        format!("{}/v1/projects/{}/content", self.base_url, script_id)
    }
}

impl Default for GoogleScriptsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptsApi for GoogleScriptsClient {
    async fn get_content(
        &self,
        credential: &Credential,
        script_id: &str,
    ) -> Result<ScriptProject, ApiError> {
        tracing::debug!(script_id, "Fetching script project");

        let request = self
            .client
            .get(self.content_url(script_id))
            .header("Authorization", credential.bearer());
        send_json(request).await
    }

    async fn update_content(
        &self,
        credential: &Credential,
        script_id: &str,
        files: &[ScriptFile],
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.content_url(script_id))
            .header("Authorization", credential.bearer())
            .json(&json!({ "scriptId": script_id, "files": files }));
        send(request).await
    }
}
