pub mod document_service;

pub use document_service::{DocsApi, Document, DocumentService};
