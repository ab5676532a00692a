//! AI-OCR adapter: PDFs and raster images transcribed by a vision model.

use std::sync::Arc;

use async_trait::async_trait;

use studia_core::{Error, ExtractionAdapter, ExtractionResult, ExtractionStrategy, Result};
use studia_inference::OcrBackend;

/// Adapter sending the whole file to a vision model in one request.
///
/// The backend's answer is taken verbatim; trimming and length checks happen
/// in the shared post-processing step.
pub struct AiOcrAdapter {
    backend: Arc<dyn OcrBackend>,
}

impl AiOcrAdapter {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ExtractionAdapter for AiOcrAdapter {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::AiOcr
    }

    async fn extract(
        &self,
        data: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<ExtractionResult> {
        if data.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot run OCR on an empty file".to_string(),
            ));
        }

        let text = self.backend.extract_text(data, mime_type).await?;

        Ok(ExtractionResult {
            extracted_text: text,
            metadata: serde_json::json!({
                "model": self.backend.model_name(),
                "file_name": file_name,
                "mime_type": mime_type,
                "size_bytes": data.len(),
            }),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }

    fn name(&self) -> &str {
        "ai_ocr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{OcrReply, ScriptedOcrBackend};

    #[tokio::test]
    async fn test_returns_backend_text_verbatim() {
        let backend = Arc::new(ScriptedOcrBackend::new(OcrReply::Text(
            "  Lecture 3\n| x | y |".to_string(),
        )));
        let adapter = AiOcrAdapter::new(backend.clone());

        let result = adapter
            .extract(b"%PDF-1.4", "lecture.pdf", "application/pdf")
            .await
            .unwrap();
        assert_eq!(result.extracted_text, "  Lecture 3\n| x | y |");
        assert_eq!(result.metadata["mime_type"], "application/pdf");
        assert_eq!(backend.calls(), 1);
        assert_eq!(backend.last_mime().as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_empty_data_skips_backend() {
        let backend = Arc::new(ScriptedOcrBackend::new(OcrReply::Text("x".into())));
        let adapter = AiOcrAdapter::new(backend.clone());

        let result = adapter.extract(b"", "blank.png", "image/png").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let backend = Arc::new(ScriptedOcrBackend::new(OcrReply::Status(429)));
        let adapter = AiOcrAdapter::new(backend);

        let result = adapter.extract(b"img", "scan.png", "image/png").await;
        assert!(matches!(result, Err(Error::RateLimited(_))));
    }

    #[test]
    fn test_strategy() {
        let adapter = AiOcrAdapter::new(Arc::new(ScriptedOcrBackend::new(OcrReply::Text(
            String::new(),
        ))));
        assert_eq!(adapter.strategy(), ExtractionStrategy::AiOcr);
        assert_eq!(adapter.name(), "ai_ocr");
    }
}
