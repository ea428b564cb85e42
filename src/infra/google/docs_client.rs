// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================
//
// Reads documents through `documents.get` and applies planned edits through
// `documents.batchUpdate`.
//
// **Index model:**
// The API reports `startIndex`/`endIndex` on every structural element and
// paragraph element, in UTF-16 code units. They are carried into the core
// `Body` unchanged so the segment map can address text exactly, including
// text that follows images or other non-text inline objects.
//
// **Environment:**
// No variables of its own; credentials are passed in per call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::http::{send, send_json};
use crate::core::auth::Credential;
use crate::core::documents::{DocsApi, Document};
use crate::core::editing::text_indexer::{ElementKind, Paragraph, Table, TextRun};
use crate::core::editing::{
    ApiError, Body, EditOperation, FormatStyle, NamedStyle, ParagraphStyle, StructuralElement,
    TextStyle,
};

const DOCS_API_BASE: &str = "https://docs.googleapis.com";

// =============================================================================
// GOOGLE DOCS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocument {
    document_id: String,
    #[serde(default)]
    title: String,
    body: Option<ApiBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiBody {
    #[serde(default)]
    content: Vec<ApiStructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStructuralElement {
    start_index: Option<usize>,
    end_index: Option<usize>,
    paragraph: Option<ApiParagraph>,
    table: Option<ApiTable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiParagraph {
    #[serde(default)]
    elements: Vec<ApiParagraphElement>,
    paragraph_style: Option<ApiParagraphStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiParagraphStyle {
    named_style_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiParagraphElement {
    start_index: Option<usize>,
    text_run: Option<ApiTextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTextRun {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTable {
    #[serde(default)]
    table_rows: Vec<ApiTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableRow {
    #[serde(default)]
    table_cells: Vec<ApiTableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableCell {
    #[serde(default)]
    content: Vec<ApiStructuralElement>,
}

fn convert_body(content: Vec<ApiStructuralElement>) -> Body {
    Body::new(content.into_iter().map(convert_element).collect())
}

fn convert_element(element: ApiStructuralElement) -> StructuralElement {
    let kind = if let Some(paragraph) = element.paragraph {
        let named_style = paragraph
            .paragraph_style
            .and_then(|s| s.named_style_type)
            .map(|s| NamedStyle::from_api(&s))
            .unwrap_or_default();
        let runs = paragraph
            .elements
            .into_iter()
            .filter_map(|e| {
                let content = e.text_run?.content?;
                Some(TextRun {
                    start_index: e.start_index,
                    content,
                })
            })
            .collect();
        ElementKind::Paragraph(Paragraph { runs, named_style })
    } else if let Some(table) = element.table {
        let rows = table
            .table_rows
            .into_iter()
            .map(|row| {
                row.table_cells
                    .into_iter()
                    .map(|cell| convert_body(cell.content))
                    .collect()
            })
            .collect();
        ElementKind::Table(Table { rows })
    } else {
        ElementKind::Other
    };

    StructuralElement {
        start_index: element.start_index,
        end_index: element.end_index,
        kind,
    }
}

// =============================================================================
// BATCH UPDATE REQUESTS
// =============================================================================

fn range(start: usize, end: usize) -> Value {
    json!({ "startIndex": start, "endIndex": end })
}

fn text_style_request(start: usize, end: usize, style: &TextStyle) -> Value {
    let mut text_style = serde_json::Map::new();
    if let Some(bold) = style.bold {
        text_style.insert("bold".into(), json!(bold));
    }
    if let Some(italic) = style.italic {
        text_style.insert("italic".into(), json!(italic));
    }
    if let Some(underline) = style.underline {
        text_style.insert("underline".into(), json!(underline));
    }
    if let Some(strikethrough) = style.strikethrough {
        text_style.insert("strikethrough".into(), json!(strikethrough));
    }
    if let Some(size) = style.font_size {
        text_style.insert("fontSize".into(), json!({ "magnitude": size, "unit": "PT" }));
    }
    if let Some(family) = &style.font_family {
        text_style.insert("weightedFontFamily".into(), json!({ "fontFamily": family }));
    }
    if let Some(color) = style.foreground {
        text_style.insert("foregroundColor".into(), json!({ "color": { "rgbColor": color } }));
    }
    if let Some(color) = style.background {
        text_style.insert("backgroundColor".into(), json!({ "color": { "rgbColor": color } }));
    }

    json!({
        "updateTextStyle": {
            "range": range(start, end),
            "textStyle": text_style,
            "fields": style.fields().join(","),
        }
    })
}

fn paragraph_style_request(start: usize, end: usize, style: &ParagraphStyle) -> Value {
    let mut paragraph_style = serde_json::Map::new();
    let mut fields = Vec::new();
    if let Some(named) = style.named_style {
        paragraph_style.insert("namedStyleType".into(), json!(named.as_api_str()));
        fields.push("namedStyleType");
    }
    if let Some(alignment) = style.alignment {
        paragraph_style.insert("alignment".into(), json!(alignment.as_api_str()));
        fields.push("alignment");
    }

    json!({
        "updateParagraphStyle": {
            "range": range(start, end),
            "paragraphStyle": paragraph_style,
            "fields": fields.join(","),
        }
    })
}

/// One `batchUpdate` request per planned operation, order preserved.
pub(crate) fn to_request(operation: &EditOperation) -> Value {
    match operation {
        EditOperation::Delete { start, end } => json!({
            "deleteContentRange": { "range": range(*start, *end) }
        }),
        EditOperation::Insert { index, text } => json!({
            "insertText": { "location": { "index": index }, "text": text }
        }),
        EditOperation::FormatRange { start, end, style } => match style {
            FormatStyle::Text(style) => text_style_request(*start, *end, style),
            FormatStyle::Paragraph(style) => paragraph_style_request(*start, *end, style),
        },
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct GoogleDocsClient {
    client: Client,
    base_url: String,
}

impl GoogleDocsClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DOCS_API_BASE.to_string(),
        }
    }

    /// Accepts a bare document ID or a full `docs.google.com/document/d/<id>/...` URL.
    pub fn extract_doc_id(url_or_id: &str) -> &str {
        match url_or_id.find("/document/d/") {
            Some(start) => {
                let after_d = &url_or_id[start + "/document/d/".len()..];
                let end = after_d.find('/').unwrap_or(after_d.len());
                &after_d[..end]
            }
            None => url_or_id.trim(),
        }
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/v1/documents/{}",
            self.base_url,
            Self::extract_doc_id(document_id)
        )
    }
}

impl Default for GoogleDocsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocsApi for GoogleDocsClient {
    async fn get_document(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<Document, ApiError> {
        tracing::debug!("Fetching Google Doc via API: {}", document_id);

        let request = self
            .client
            .get(self.document_url(document_id))
            .header("Authorization", credential.bearer());
        let document: ApiDocument = send_json(request).await?;

        Ok(Document {
            document_id: document.document_id,
            title: document.title,
            body: convert_body(document.body.map(|b| b.content).unwrap_or_default()),
        })
    }

    async fn batch_update(
        &self,
        credential: &Credential,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), ApiError> {
        let requests: Vec<Value> = operations.iter().map(to_request).collect();
        let request = self
            .client
            .post(format!("{}:batchUpdate", self.document_url(document_id)))
            .header("Authorization", credential.bearer())
            .json(&json!({ "requests": requests }));
        send(request).await
    }
}
