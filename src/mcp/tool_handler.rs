// Dispatches `tools/call` requests to the document, sheet and script services.
//
// A credential is obtained for every call. Engine and auth failures become
// tool results with `isError` set so the calling model can read and react to
// them; only an unknown tool name is a protocol error.

use serde_json::{json, Value};
use std::sync::Arc;

use super::arguments::{
    batch_operations, insert_position, optional_bool, optional_str, paragraph_style,
    required_str, script_file_type, section_identifier, section_target, substitution, text_style,
};
use super::protocol::{JsonRpcError, ToolResult};
use super::tool_catalog::tool_catalog;
use crate::core::auth::{AuthProvider, Credential};
use crate::core::documents::{DocsApi, DocumentService};
use crate::core::editing::{EditError, Section, SectionMove};
use crate::core::scripts::{ScriptService, ScriptsApi};
use crate::core::sheets::{SheetService, SheetsApi};

const DEFAULT_SHEET_RANGE: &str = "Sheet1";

fn occurrences(count: usize) -> String {
    if count == 1 {
        "Replaced 1 occurrence".to_string()
    } else {
        format!("Replaced {} occurrences", count)
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn section_json(section: &Section) -> Value {
    json!({
        "name": section.name,
        "level": section.level,
        "startIndex": section.start_index,
        "endIndex": section.end_index,
        "index": section.ordinal,
    })
}

pub struct ToolHandler<D: DocsApi, S: SheetsApi, P: ScriptsApi> {
    auth: Arc<dyn AuthProvider>,
    docs: DocumentService<D>,
    sheets: SheetService<S>,
    scripts: ScriptService<P>,
}

impl<D: DocsApi, S: SheetsApi, P: ScriptsApi> ToolHandler<D, S, P> {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        docs: DocumentService<D>,
        sheets: SheetService<S>,
        scripts: ScriptService<P>,
    ) -> Self {
        Self {
            auth,
            docs,
            sheets,
            scripts,
        }
    }

    pub async fn call(&self, name: &str, args: &Value) -> Result<ToolResult, JsonRpcError> {
        if !tool_catalog().iter().any(|tool| tool.name == name) {
            return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", name)));
        }

        let credential = match self.auth.credential().await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(tool = name, "Authentication failed: {}", e);
                return Ok(ToolResult::error(format!("Authentication failed: {}", e)));
            }
        };

        match self.dispatch(name, args, &credential).await {
            Ok(text) => Ok(ToolResult::text(text)),
            Err(e) => {
                tracing::warn!(tool = name, kind = ?e.kind(), "Tool call failed: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }

    async fn dispatch(
        &self,
        name: &str,
        args: &Value,
        credential: &Credential,
    ) -> Result<String, EditError> {
        tracing::debug!(tool = name, "Handling tool call");

        match name {
            // ================================================================
            // DOCS
            // ================================================================
            "docs_read" => {
                self.docs
                    .read_document(credential, required_str(args, "doc_id")?)
                    .await
            }
            "docs_edit" => {
                let count = self
                    .docs
                    .edit_document(credential, required_str(args, "doc_id")?, &substitution(args)?)
                    .await?;
                Ok(occurrences(count))
            }
            "docs_delete" => {
                let count = self
                    .docs
                    .delete_text(
                        credential,
                        required_str(args, "doc_id")?,
                        required_str(args, "text")?,
                        optional_bool(args, "delete_all")?.unwrap_or(false),
                    )
                    .await?;
                Ok(format!("Deleted {} occurrence(s)", count))
            }
            "docs_insert" => {
                let index = self
                    .docs
                    .insert_text(
                        credential,
                        required_str(args, "doc_id")?,
                        required_str(args, "text")?,
                        &insert_position(args.get("position"))?,
                    )
                    .await?;
                Ok(format!("Inserted text at index {}", index))
            }
            "docs_format" => {
                let count = self
                    .docs
                    .format_text(
                        credential,
                        required_str(args, "doc_id")?,
                        required_str(args, "search_text")?,
                        &text_style(args)?,
                        &paragraph_style(args)?,
                    )
                    .await?;
                Ok(format!("Formatted {} occurrence(s)", count))
            }
            "docs_batch" => {
                let applied = self
                    .docs
                    .apply_batch(
                        credential,
                        required_str(args, "doc_id")?,
                        &batch_operations(args.get("operations"))?,
                    )
                    .await?;
                Ok(format!("Applied {} operations", applied))
            }
            "docs_get_sections" => {
                let sections = self
                    .docs
                    .list_sections(credential, required_str(args, "doc_id")?)
                    .await?;
                let list: Vec<Value> = sections.iter().map(section_json).collect();
                Ok(pretty(&Value::Array(list)))
            }
            "docs_delete_section" => {
                let section = self
                    .docs
                    .delete_section(
                        credential,
                        required_str(args, "doc_id")?,
                        &section_identifier(args.get("section"))?,
                    )
                    .await?;
                Ok(format!("Deleted section \"{}\"", section.name))
            }
            "docs_move_section" => {
                let moved = self
                    .docs
                    .move_section(
                        credential,
                        required_str(args, "doc_id")?,
                        &section_identifier(args.get("section"))?,
                        &section_target(args.get("target"))?,
                    )
                    .await?;
                Ok(match moved {
                    SectionMove::Planned { section, .. } => {
                        format!("Moved section \"{}\"", section.name)
                    }
                    SectionMove::Unchanged { section } => format!(
                        "Section \"{}\" is already at the target position",
                        section.name
                    ),
                })
            }
            "docs_replace_section" => {
                let preserve_heading = optional_bool(args, "preserve_heading")?.unwrap_or(true);
                let section = self
                    .docs
                    .replace_section(
                        credential,
                        required_str(args, "doc_id")?,
                        &section_identifier(args.get("section"))?,
                        required_str(args, "content")?,
                        preserve_heading,
                    )
                    .await?;
                Ok(format!(
                    "Replaced section \"{}\" (heading preserved: {})",
                    section.name, preserve_heading
                ))
            }

            // ================================================================
            // SHEETS
            // ================================================================
            "sheets_read" => {
                let range = optional_str(args, "range")?.unwrap_or(DEFAULT_SHEET_RANGE);
                let values = self
                    .sheets
                    .read_range(credential, required_str(args, "sheet_id")?, range)
                    .await?;
                Ok(pretty(&json!(values)))
            }
            "sheets_set_cell" => {
                let cell = required_str(args, "cell")?;
                let value = args
                    .get("value")
                    .cloned()
                    .ok_or_else(|| EditError::invalid("Missing 'value' argument"))?;
                self.sheets
                    .set_cell(credential, required_str(args, "sheet_id")?, cell, value)
                    .await?;
                Ok(format!("Set cell {}", cell))
            }
            "sheets_edit_cell" => {
                let cell = required_str(args, "cell")?;
                let count = self
                    .sheets
                    .edit_cell(
                        credential,
                        required_str(args, "sheet_id")?,
                        cell,
                        &substitution(args)?,
                    )
                    .await?;
                Ok(format!("Replaced {} occurrence(s) in cell {}", count, cell))
            }
            "sheets_edit_range" => {
                let range = required_str(args, "range")?;
                let count = self
                    .sheets
                    .edit_range(
                        credential,
                        required_str(args, "sheet_id")?,
                        range,
                        &substitution(args)?,
                    )
                    .await?;
                Ok(format!("Replaced {} occurrence(s) in range {}", count, range))
            }

            // ================================================================
            // APPS SCRIPT
            // ================================================================
            "scripts_read" => {
                let project = self
                    .scripts
                    .read_project(credential, required_str(args, "script_id")?)
                    .await?;
                Ok(pretty(&json!(project)))
            }
            "scripts_edit" => {
                let file_name = required_str(args, "file_name")?;
                let count = self
                    .scripts
                    .edit_file(
                        credential,
                        required_str(args, "script_id")?,
                        file_name,
                        &substitution(args)?,
                    )
                    .await?;
                Ok(format!("Replaced {} occurrence(s) in {}", count, file_name))
            }
            "scripts_write" => {
                let file_name = required_str(args, "file_name")?;
                let created = self
                    .scripts
                    .write_file(
                        credential,
                        required_str(args, "script_id")?,
                        file_name,
                        required_str(args, "content")?,
                        script_file_type(args)?,
                    )
                    .await?;
                Ok(format!(
                    "Wrote file \"{}\" ({})",
                    file_name,
                    if created { "created" } else { "updated" }
                ))
            }

            other => Err(EditError::invalid(format!("Unknown tool: {}", other))),
        }
    }
}
