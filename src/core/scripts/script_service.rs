// Apps Script project files.
//
// The Script API only accepts whole-project content updates, so every write
// sends back all files with one of them changed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::auth::Credential;
use crate::core::editing::{
    plan_substitution, ApiError, EditError, EditTarget, NativeAddressing, NativeRange,
    Occurrence, Substitution,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptFileType {
    #[default]
    ServerJs,
    Html,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFile {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: ScriptFileType,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptProject {
    pub script_id: String,
    #[serde(default)]
    pub files: Vec<ScriptFile>,
}

impl ScriptProject {
    fn position(&self, file_name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == file_name)
    }

    fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }
}

impl NativeAddressing for ScriptFile {
    fn searchable_text(&self) -> &str {
        &self.source
    }

    fn to_native_range(&self, occurrence: &Occurrence) -> Result<NativeRange, EditError> {
        Ok(NativeRange {
            start: occurrence.flat_start,
            end: occurrence.flat_end,
        })
    }

    fn is_whole_value_target(&self) -> bool {
        true
    }
}

/// Content source and applier for Apps Script projects.
#[async_trait]
pub trait ScriptsApi: Send + Sync {
    async fn get_content(
        &self,
        credential: &Credential,
        script_id: &str,
    ) -> Result<ScriptProject, ApiError>;

    async fn update_content(
        &self,
        credential: &Credential,
        script_id: &str,
        files: &[ScriptFile],
    ) -> Result<(), ApiError>;
}

pub struct ScriptService<C: ScriptsApi> {
    client: C,
}

impl<C: ScriptsApi> ScriptService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn read_project(
        &self,
        credential: &Credential,
        script_id: &str,
    ) -> Result<ScriptProject, EditError> {
        Ok(self.client.get_content(credential, script_id).await?)
    }

    /// Unique-match replacement inside one file.
    pub async fn edit_file(
        &self,
        credential: &Credential,
        script_id: &str,
        file_name: &str,
        substitution: &Substitution,
    ) -> Result<usize, EditError> {
        let mut project = self.read_project(credential, script_id).await?;
        let position = project
            .position(file_name)
            .ok_or_else(|| EditError::FileNotFound {
                name: file_name.to_string(),
                available: project.file_names(),
            })?;

        let planned = plan_substitution(
            &project.files[position],
            &EditTarget::File(file_name.to_string()),
            substitution,
        )?;
        let replacements = planned.replacements;
        project.files[position].source = planned
            .plan
            .into_whole_value()
            .ok_or_else(|| EditError::invalid("Script edits must plan a whole value."))?;

        self.client
            .update_content(credential, script_id, &project.files)
            .await?;
        tracing::info!(script_id, file_name, replacements, "Edited script file");
        Ok(replacements)
    }

    /// Overwrite a file, or add it when missing. Returns true for a new file.
    /// An existing file keeps its type.
    pub async fn write_file(
        &self,
        credential: &Credential,
        script_id: &str,
        file_name: &str,
        content: &str,
        file_type: Option<ScriptFileType>,
    ) -> Result<bool, EditError> {
        let mut project = self.read_project(credential, script_id).await?;

        let created = match project.position(file_name) {
            Some(position) => {
                project.files[position].source = content.to_string();
                false
            }
            None => {
                project.files.push(ScriptFile {
                    name: file_name.to_string(),
                    file_type: file_type.unwrap_or_default(),
                    source: content.to_string(),
                });
                true
            }
        };

        self.client
            .update_content(credential, script_id, &project.files)
            .await?;
        tracing::info!(script_id, file_name, created, "Wrote script file");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockScriptsApi {
        project: ScriptProject,
        updates: Mutex<Vec<Vec<ScriptFile>>>,
    }

    impl MockScriptsApi {
        fn new(files: Vec<ScriptFile>) -> Self {
            Self {
                project: ScriptProject {
                    script_id: "script-1".to_string(),
                    files,
                },
                updates: Mutex::new(Vec::new()),
            }
        }

        fn last_update(&self) -> Option<Vec<ScriptFile>> {
            self.updates.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl ScriptsApi for MockScriptsApi {
        async fn get_content(
            &self,
            _credential: &Credential,
            _script_id: &str,
        ) -> Result<ScriptProject, ApiError> {
            Ok(self.project.clone())
        }

        async fn update_content(
            &self,
            _credential: &Credential,
            _script_id: &str,
            files: &[ScriptFile],
        ) -> Result<(), ApiError> {
            self.updates.lock().unwrap().push(files.to_vec());
            Ok(())
        }
    }

    fn file(name: &str, file_type: ScriptFileType, source: &str) -> ScriptFile {
        ScriptFile {
            name: name.to_string(),
            file_type,
            source: source.to_string(),
        }
    }

    fn sample() -> MockScriptsApi {
        MockScriptsApi::new(vec![
            file("appsscript", ScriptFileType::Json, "{}"),
            file("Code", ScriptFileType::ServerJs, "function run() { log(1); log(1); }"),
        ])
    }

    fn credential() -> Credential {
        Credential::new("token")
    }

    #[tokio::test]
    async fn test_edit_file_sends_every_file_back() {
        let service = ScriptService::new(sample());

        let replaced = service
            .edit_file(
                &credential(),
                "script-1",
                "Code",
                &Substitution::new("log(1)", "log(2)", true),
            )
            .await
            .unwrap();

        assert_eq!(replaced, 2);
        let files = service.client.last_update().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].source, "function run() { log(2); log(2); }");
        assert_eq!(files[0].source, "{}");
    }

    #[tokio::test]
    async fn test_edit_file_is_unique_by_default() {
        let service = ScriptService::new(sample());

        let err = service
            .edit_file(
                &credential(),
                "script-1",
                "Code",
                &Substitution::new("log(1)", "log(2)", false),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("in file \"Code\""));
        assert!(service.client.last_update().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_lists_available_files() {
        let service = ScriptService::new(sample());

        let err = service
            .edit_file(
                &credential(),
                "script-1",
                "Utils",
                &Substitution::new("a", "b", false),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "File \"Utils\" not found in script. Available files: appsscript, Code"
        );
    }

    #[tokio::test]
    async fn test_write_file_creates_or_overwrites() {
        let service = ScriptService::new(sample());

        let created = service
            .write_file(
                &credential(),
                "script-1",
                "Sidebar",
                "<p>hi</p>",
                Some(ScriptFileType::Html),
            )
            .await
            .unwrap();
        assert!(created);
        let files = service.client.last_update().unwrap();
        assert_eq!(files[2].file_type, ScriptFileType::Html);

        let created = service
            .write_file(&credential(), "script-1", "appsscript", "{ }", Some(ScriptFileType::Html))
            .await
            .unwrap();
        assert!(!created);
        let files = service.client.last_update().unwrap();
        assert_eq!(files[0].file_type, ScriptFileType::Json);
        assert_eq!(files[0].source, "{ }");
    }

    #[test]
    fn test_file_type_uses_api_spelling() {
        let json = serde_json::to_value(file("Code", ScriptFileType::ServerJs, "")).unwrap();
        assert_eq!(json["type"], "SERVER_JS");
    }
}
