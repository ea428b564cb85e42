// Google Docs editing on top of the substitution engine.
//
// Every operation is one read-plan-apply cycle: fetch the document, derive
// whatever it needs (flattened text, sections) from that snapshot, and submit
// the planned operations as a single batch. Nothing is cached between calls.

use async_trait::async_trait;

use crate::core::auth::Credential;
use crate::core::editing::edit_planner::{plan_batch, plan_format, plan_insert};
use crate::core::editing::section_model::{
    plan_delete_section, plan_move_section, plan_replace_section, sections,
};
use crate::core::editing::{
    find_all_where, flatten, plan_substitution, ApiError, BatchOperation, Body, EditError,
    EditOperation, EditTarget, InsertPosition, NativeAddressing, ParagraphStyle, Section,
    SectionIdentifier, SectionMove, SectionTarget, Substitution, TextStyle,
};

/// A fetched document: the body is everything the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub document_id: String,
    pub title: String,
    pub body: Body,
}

/// Content source and applier for Google Docs.
#[async_trait]
pub trait DocsApi: Send + Sync {
    async fn get_document(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<Document, ApiError>;

    /// Submit `operations` in order as one atomic batch.
    async fn batch_update(
        &self,
        credential: &Credential,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), ApiError>;
}

pub struct DocumentService<C: DocsApi> {
    client: C,
}

impl<C: DocsApi> DocumentService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    async fn fetch(&self, credential: &Credential, document_id: &str) -> Result<Document, EditError> {
        Ok(self.client.get_document(credential, document_id).await?)
    }

    async fn apply(
        &self,
        credential: &Credential,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), EditError> {
        tracing::debug!(
            document_id,
            operations = operations.len(),
            "Submitting document batch update"
        );
        self.client
            .batch_update(credential, document_id, operations)
            .await?;
        Ok(())
    }

    /// The document's flattened text, exactly as edits match against it.
    pub async fn read_document(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<String, EditError> {
        let document = self.fetch(credential, document_id).await?;
        Ok(flatten(&document.body).text().to_string())
    }

    /// Unique-match replacement. Returns the number of occurrences replaced.
    pub async fn edit_document(
        &self,
        credential: &Credential,
        document_id: &str,
        substitution: &Substitution,
    ) -> Result<usize, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let flat = flatten(&document.body);

        let planned = plan_substitution(&flat, &EditTarget::Document, substitution)?;
        let replacements = planned.replacements;
        let operations = planned
            .plan
            .into_operations()
            .ok_or_else(|| EditError::invalid("Document edits must plan range operations."))?;

        self.apply(credential, document_id, &operations).await?;
        tracing::info!(document_id, replacements, "Replaced text in document");
        Ok(replacements)
    }

    pub async fn delete_text(
        &self,
        credential: &Credential,
        document_id: &str,
        text: &str,
        delete_all: bool,
    ) -> Result<usize, EditError> {
        let substitution = Substitution::new(text, "", delete_all);
        self.edit_document(credential, document_id, &substitution)
            .await
    }

    /// Insert `text` and return the native index it was inserted at.
    pub async fn insert_text(
        &self,
        credential: &Credential,
        document_id: &str,
        text: &str,
        position: &InsertPosition,
    ) -> Result<usize, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let flat = flatten(&document.body);

        let operations = plan_insert(&flat, position, text)?;
        let index = match operations.first() {
            Some(EditOperation::Insert { index, .. }) => *index,
            _ => flat.end_insert_index(),
        };

        self.apply(credential, document_id, &operations).await?;
        tracing::info!(document_id, index, chars = text.chars().count(), "Inserted text");
        Ok(index)
    }

    /// Style every occurrence of `search_text`. Returns how many were formatted.
    pub async fn format_text(
        &self,
        credential: &Credential,
        document_id: &str,
        search_text: &str,
        text_style: &TextStyle,
        paragraph_style: &ParagraphStyle,
    ) -> Result<usize, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let flat = flatten(&document.body);

        let occurrences = find_all_where(flat.text(), search_text, |o| flat.accepts(o))?;
        if occurrences.is_empty() {
            return Err(EditError::TextNotFound {
                target: EditTarget::Document,
            });
        }
        let operations = plan_format(&occurrences, &flat, text_style, paragraph_style)?;

        self.apply(credential, document_id, &operations).await?;
        tracing::info!(
            document_id,
            occurrences = occurrences.len(),
            "Formatted text"
        );
        Ok(occurrences.len())
    }

    /// Apply client-supplied operations. Returns the number submitted.
    pub async fn apply_batch(
        &self,
        credential: &Credential,
        document_id: &str,
        operations: &[BatchOperation],
    ) -> Result<usize, EditError> {
        let planned = plan_batch(operations)?;
        self.apply(credential, document_id, &planned).await?;
        tracing::info!(document_id, operations = planned.len(), "Applied batch");
        Ok(planned.len())
    }

    pub async fn list_sections(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<Vec<Section>, EditError> {
        let document = self.fetch(credential, document_id).await?;
        Ok(sections(&document.body))
    }

    pub async fn delete_section(
        &self,
        credential: &Credential,
        document_id: &str,
        identifier: &SectionIdentifier,
    ) -> Result<Section, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let edit = plan_delete_section(&document.body, identifier)?;

        self.apply(credential, document_id, &edit.operations).await?;
        tracing::info!(document_id, section = %edit.section.name, "Deleted section");
        Ok(edit.section)
    }

    pub async fn move_section(
        &self,
        credential: &Credential,
        document_id: &str,
        identifier: &SectionIdentifier,
        target: &SectionTarget,
    ) -> Result<SectionMove, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let planned = plan_move_section(&document.body, identifier, target)?;

        match &planned {
            SectionMove::Planned {
                section,
                target_index,
                operations,
            } => {
                self.apply(credential, document_id, operations).await?;
                tracing::info!(
                    document_id,
                    section = %section.name,
                    target_index,
                    "Moved section"
                );
            }
            SectionMove::Unchanged { section } => {
                tracing::debug!(document_id, section = %section.name, "Section already in place");
            }
        }
        Ok(planned)
    }

    pub async fn replace_section(
        &self,
        credential: &Credential,
        document_id: &str,
        identifier: &SectionIdentifier,
        content: &str,
        preserve_heading: bool,
    ) -> Result<Section, EditError> {
        let document = self.fetch(credential, document_id).await?;
        let edit = plan_replace_section(&document.body, identifier, content, preserve_heading)?;

        self.apply(credential, document_id, &edit.operations).await?;
        tracing::info!(
            document_id,
            section = %edit.section.name,
            preserve_heading,
            "Replaced section"
        );
        Ok(edit.section)
    }
}
