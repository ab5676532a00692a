//! Data models for materials and extraction results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// MATERIAL
// =============================================================================

/// One uploaded study document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    /// User who uploaded the material. All access is scoped to this id.
    pub user_id: Uuid,
    /// Display name, may differ from the sanitized storage key.
    pub file_name: String,
    /// Declared MIME type. Not trusted on its own.
    pub file_type: Option<String>,
    /// Locator of the binary in object storage.
    pub storage_path: Option<String>,
    /// Extracted plain text, absent until an extraction succeeds.
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Uploaded but not yet queryable: the file exists, its text does not.
    pub fn is_pending_extraction(&self) -> bool {
        self.storage_path.is_some() && self.content.is_none()
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// How a file's text is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// ZIP + `word/document.xml` run scan, no network call.
    DocxStructural,
    /// Vision model OCR through the LLM gateway.
    AiOcr,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::DocxStructural => "docx_structural",
            ExtractionStrategy::AiOcr => "ai_ocr",
        }
    }
}

/// Raw output of one extraction adapter, before post-processing.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub extracted_text: String,
    /// Adapter-specific details (paragraph count, model, ...) for logging.
    pub metadata: JsonValue,
}

/// What a successful extraction persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub material_id: Uuid,
    pub strategy: ExtractionStrategy,
    /// Character count of the persisted content.
    pub content_length: usize,
    pub truncated: bool,
    pub preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(storage_path: Option<&str>, content: Option<&str>) -> Material {
        Material {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_name: "notes.pdf".to_string(),
            file_type: Some("application/pdf".to_string()),
            storage_path: storage_path.map(str::to_string),
            content: content.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_extraction_when_stored_without_content() {
        assert!(material(Some("u/notes.pdf"), None).is_pending_extraction());
    }

    #[test]
    fn test_not_pending_once_content_present() {
        assert!(!material(Some("u/notes.pdf"), Some("text")).is_pending_extraction());
    }

    #[test]
    fn test_not_pending_without_storage_path() {
        assert!(!material(None, None).is_pending_extraction());
    }

    #[test]
    fn test_material_serializes_camel_case() {
        let json = serde_json::to_value(material(Some("a/b.pdf"), None)).unwrap();
        assert_eq!(json["storagePath"], "a/b.pdf");
        assert_eq!(json["fileName"], "notes.pdf");
        assert!(json["content"].is_null());
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(ExtractionStrategy::DocxStructural.as_str(), "docx_structural");
        assert_eq!(ExtractionStrategy::AiOcr.as_str(), "ai_ocr");
    }
}
