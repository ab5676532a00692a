//! Vision OCR over the LLM gateway.

use async_trait::async_trait;
use base64::Engine;
use std::time::Instant;
use tracing::{debug, info};

use studia_core::Result;

use crate::openai::{
    ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, OpenAIBackend,
};

/// System instruction for verbatim transcription.
pub const OCR_SYSTEM_PROMPT: &str = "You are a precise OCR engine. Transcribe every piece of \
text in the provided document exactly as written. Preserve the natural reading order, \
paragraph breaks and headings. Keep all diacritics, special characters and numbers intact. \
Render tables as Markdown tables. Do not summarise, translate, correct, or interpret the \
content. Output only the transcribed text with no preamble or commentary.";

/// User-turn instruction accompanying the document.
pub const OCR_USER_PROMPT: &str =
    "Extract all text from this document verbatim. Return only the extracted text.";

/// Backend capable of transcribing text from a PDF or raster image.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Transcribe the text contained in `data`, whose MIME type is `mime_type`.
    async fn extract_text(&self, data: &[u8], mime_type: &str) -> Result<String>;

    /// Check if the OCR backend is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Encode bytes as a `data:<mime>;base64,...` URI.
pub fn data_uri(data: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, encoded)
}

/// Build the single non-streaming OCR chat completion.
pub fn build_ocr_request(
    model: &str,
    data: &[u8],
    mime_type: &str,
    temperature: f32,
    max_tokens: u32,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(OCR_SYSTEM_PROMPT),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: OCR_USER_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_uri(data, mime_type),
                    },
                },
            ]),
        ],
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        stream: false,
    }
}

#[async_trait]
impl OcrBackend for OpenAIBackend {
    async fn extract_text(&self, data: &[u8], mime_type: &str) -> Result<String> {
        let config = self.config();
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "ocr",
            model = %config.ocr_model,
            mime_type,
            size_bytes = data.len(),
            "Sending OCR request"
        );

        let request = build_ocr_request(
            &config.ocr_model,
            data,
            mime_type,
            config.temperature,
            config.max_tokens,
        );
        let response = self.chat_completion(&request).await?;
        let text = response.first_content();

        info!(
            subsystem = "inference",
            component = "ocr",
            model = %config.ocr_model,
            result_chars = text.chars().count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "OCR completed"
        );
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        OpenAIBackend::health_check(self).await
    }

    fn model_name(&self) -> &str {
        &self.config().ocr_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::MessageContent;

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_build_ocr_request_shape() {
        let request = build_ocr_request("vision", b"%PDF-1.7", "application/pdf", 0.1, 16_000);
        assert_eq!(request.model, "vision");
        assert!(!request.stream);
        assert_eq!(request.max_tokens, Some(16_000));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");

        let MessageContent::Parts(ref parts) = request.messages[1].content else {
            panic!("user message should be multimodal");
        };
        assert_eq!(parts.len(), 2);
        match &parts[1] {
            ContentPart::ImageUrl { image_url } => {
                assert!(image_url.url.starts_with("data:application/pdf;base64,"));
            }
            other => panic!("Expected image part, got {:?}", other),
        }
    }

    #[test]
    fn test_system_prompt_demands_verbatim_output() {
        assert!(OCR_SYSTEM_PROMPT.contains("exactly as written"));
        assert!(OCR_SYSTEM_PROMPT.contains("Markdown"));
        assert!(OCR_SYSTEM_PROMPT.contains("Do not summarise"));
    }
}
