// Tool definitions advertised by `tools/list`.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn tool(name: &'static str, description: &'static str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        input_schema,
    }
}

fn doc_id() -> Value {
    json!({ "type": "string", "description": "Google Doc ID or URL" })
}

fn sheet_id() -> Value {
    json!({ "type": "string", "description": "Google Sheet ID" })
}

fn script_id() -> Value {
    json!({ "type": "string", "description": "Apps Script project ID" })
}

fn replace_all() -> Value {
    json!({ "type": "boolean", "description": "Replace all occurrences (default: false)", "default": false })
}

fn section(description: &str) -> Value {
    json!({
        "oneOf": [
            { "type": "string", "description": "Section name (heading text)" },
            { "type": "number", "description": "Section index (0-based)" }
        ],
        "description": description
    })
}

fn position() -> Value {
    json!({
        "oneOf": [
            { "type": "string", "description": "\"end\" or text to insert after" },
            { "type": "number", "description": "Character index" }
        ],
        "description": "Where to insert (default: \"end\")"
    })
}

fn docs_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "docs_read",
            "Read the full text content of a Google Doc. Returns the complete document text.",
            json!({
                "type": "object",
                "properties": { "doc_id": doc_id() },
                "required": ["doc_id"]
            }),
        ),
        tool(
            "docs_edit",
            "Performs exact string replacement in a Google Doc. The old_text must be unique in the document unless replace_all is true.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "old_text": { "type": "string", "description": "The exact text to find and replace" },
                    "new_text": { "type": "string", "description": "The text to replace it with" },
                    "replace_all": replace_all()
                },
                "required": ["doc_id", "old_text", "new_text"]
            }),
        ),
        tool(
            "docs_delete",
            "Delete text from a Google Doc by finding and removing it.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "text": { "type": "string", "description": "Text to delete" },
                    "delete_all": { "type": "boolean", "description": "Delete all occurrences (default: false)", "default": false }
                },
                "required": ["doc_id", "text"]
            }),
        ),
        tool(
            "docs_insert",
            "Insert text into a Google Doc at a specified position. Position can be \"end\" to append, a character index, or text to insert after.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "text": { "type": "string", "description": "Text to insert" },
                    "position": position()
                },
                "required": ["doc_id", "text"]
            }),
        ),
        tool(
            "docs_format",
            "Apply formatting to text in a Google Doc. Finds text and applies styles like bold, italic, colors, fonts, and paragraph styles.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "search_text": { "type": "string", "description": "Text to format (must exist in document)" },
                    "bold": { "type": "boolean", "description": "Apply bold" },
                    "italic": { "type": "boolean", "description": "Apply italic" },
                    "underline": { "type": "boolean", "description": "Apply underline" },
                    "strikethrough": { "type": "boolean", "description": "Apply strikethrough" },
                    "font_size": { "type": "number", "description": "Font size in points" },
                    "font_family": { "type": "string", "description": "Font family name (e.g., \"Arial\")" },
                    "foreground_color": { "type": "string", "description": "Text color as hex (e.g., \"#FF0000\")" },
                    "background_color": { "type": "string", "description": "Background/highlight color as hex" },
                    "heading": {
                        "type": "string",
                        "enum": ["TITLE", "SUBTITLE", "HEADING_1", "HEADING_2", "HEADING_3", "HEADING_4", "HEADING_5", "HEADING_6", "NORMAL_TEXT"],
                        "description": "Paragraph heading style"
                    },
                    "alignment": {
                        "type": "string",
                        "enum": ["LEFT", "CENTER", "RIGHT", "JUSTIFY"],
                        "description": "Paragraph alignment"
                    }
                },
                "required": ["doc_id", "search_text"]
            }),
        ),
        tool(
            "docs_batch",
            "Execute multiple document operations in a single batch. Indices are 0-based character positions.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "operations": {
                        "type": "array",
                        "description": "Array of operations: {type: \"insert\"|\"delete\"|\"format\", ...params}",
                        "items": { "type": "object" }
                    }
                },
                "required": ["doc_id", "operations"]
            }),
        ),
        tool(
            "docs_get_sections",
            "Parse document and return sections identified by headings. Each section includes name, level, start/end indices.",
            json!({
                "type": "object",
                "properties": { "doc_id": doc_id() },
                "required": ["doc_id"]
            }),
        ),
        tool(
            "docs_delete_section",
            "Delete a section by name or index. Removes the heading and all content until the next section.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "section": section("Section to delete")
                },
                "required": ["doc_id", "section"]
            }),
        ),
        tool(
            "docs_move_section",
            "Move a section to a different position in the document.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "section": section("Section to move"),
                    "target": {
                        "oneOf": [
                            { "type": "string", "description": "\"start\", \"end\", or section name to move before" },
                            { "type": "number", "description": "Target position index (0-based)" }
                        ],
                        "description": "Where to move the section"
                    }
                },
                "required": ["doc_id", "section", "target"]
            }),
        ),
        tool(
            "docs_replace_section",
            "Replace entire section content with new text. Optionally preserves the heading.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": doc_id(),
                    "section": section("Section to replace"),
                    "content": { "type": "string", "description": "New content for the section" },
                    "preserve_heading": { "type": "boolean", "description": "Keep the section heading (default: true)", "default": true }
                },
                "required": ["doc_id", "section", "content"]
            }),
        ),
    ]
}

fn sheets_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "sheets_read",
            "Read values from a Google Sheet range. Returns a 2D array of cell values.",
            json!({
                "type": "object",
                "properties": {
                    "sheet_id": sheet_id(),
                    "range": { "type": "string", "description": "A1 range notation (default: \"Sheet1\")" }
                },
                "required": ["sheet_id"]
            }),
        ),
        tool(
            "sheets_set_cell",
            "Set a single cell value in a Google Sheet. Completely replaces the cell content.",
            json!({
                "type": "object",
                "properties": {
                    "sheet_id": sheet_id(),
                    "cell": { "type": "string", "description": "Cell reference (e.g. \"A1\", \"Sheet1!B2\")" },
                    "value": { "description": "Value to set" }
                },
                "required": ["sheet_id", "cell", "value"]
            }),
        ),
        tool(
            "sheets_edit_cell",
            "Performs exact string replacement within a cell. The old_text must be unique within the cell unless replace_all is true.",
            json!({
                "type": "object",
                "properties": {
                    "sheet_id": sheet_id(),
                    "cell": { "type": "string", "description": "Cell reference" },
                    "old_text": { "type": "string", "description": "The exact text to find and replace" },
                    "new_text": { "type": "string", "description": "The text to replace it with" },
                    "replace_all": replace_all()
                },
                "required": ["sheet_id", "cell", "old_text", "new_text"]
            }),
        ),
        tool(
            "sheets_edit_range",
            "Performs exact string replacement across every cell of a range. The old_text must be unique within the range unless replace_all is true.",
            json!({
                "type": "object",
                "properties": {
                    "sheet_id": sheet_id(),
                    "range": { "type": "string", "description": "A1 range notation (e.g. \"Sheet1!A1:D20\")" },
                    "old_text": { "type": "string", "description": "The exact text to find and replace" },
                    "new_text": { "type": "string", "description": "The text to replace it with" },
                    "replace_all": replace_all()
                },
                "required": ["sheet_id", "range", "old_text", "new_text"]
            }),
        ),
    ]
}

fn scripts_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "scripts_read",
            "Read the full content of an Apps Script project including all files.",
            json!({
                "type": "object",
                "properties": { "script_id": script_id() },
                "required": ["script_id"]
            }),
        ),
        tool(
            "scripts_edit",
            "Edit a script file using the old_text/new_text pattern. The old_text must be unique in the file unless replace_all is true.",
            json!({
                "type": "object",
                "properties": {
                    "script_id": script_id(),
                    "file_name": { "type": "string", "description": "Name of the file within the project (e.g., \"Code\")" },
                    "old_text": { "type": "string", "description": "The exact text to find and replace" },
                    "new_text": { "type": "string", "description": "The text to replace it with" },
                    "replace_all": replace_all()
                },
                "required": ["script_id", "file_name", "old_text", "new_text"]
            }),
        ),
        tool(
            "scripts_write",
            "Overwrite entire script file content or create a new file.",
            json!({
                "type": "object",
                "properties": {
                    "script_id": script_id(),
                    "file_name": { "type": "string", "description": "Name of the file (e.g., \"Code\", \"Utilities\")" },
                    "content": { "type": "string", "description": "Full content for the file" },
                    "file_type": {
                        "type": "string",
                        "enum": ["SERVER_JS", "HTML", "JSON"],
                        "description": "File type for new files (default: SERVER_JS)"
                    }
                },
                "required": ["script_id", "file_name", "content"]
            }),
        ),
    ]
}

/// Every tool, in the order `tools/list` reports them.
pub fn tool_catalog() -> Vec<ToolDefinition> {
    let mut tools = docs_tools();
    tools.extend(sheets_tools());
    tools.extend(scripts_tools());
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let tools = tool_catalog();
        let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), 17);
    }

    #[test]
    fn test_required_fields_are_declared_properties() {
        for tool in tool_catalog() {
            let properties = tool.input_schema["properties"].as_object().unwrap();
            for required in tool.input_schema["required"].as_array().unwrap() {
                let name = required.as_str().unwrap();
                assert!(
                    properties.contains_key(name),
                    "{} requires undeclared {}",
                    tool.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_serialises_input_schema_in_camel_case() {
        let value = serde_json::to_value(&tool_catalog()[0]).unwrap();
        assert_eq!(value["name"], "docs_read");
        assert!(value.get("inputSchema").is_some());
    }
}
