//! HTTP handlers for studia-api.

pub mod extract;
pub mod health;

pub use extract::{extract_document_text, ExtractDocumentRequest, ExtractDocumentResponse};
pub use health::{health, HealthResponse};
