//! Request-scoped extraction pipeline.
//!
//! One call verifies ownership, resolves the file kind, downloads the binary,
//! runs the matching adapter, post-processes the text and persists it through
//! the service-privileged writer. Nothing is written unless every earlier
//! step succeeded.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use studia_core::file_kind::{mime_essence, GENERIC_MIME};
use studia_core::text::{ensure_usable, preview, truncate_content};
use studia_core::{
    Error, ExtractionConfig, ExtractionOutcome, ExtractionStrategy, FileKind, Identity,
    MaterialContentWriter, MaterialRepository, ObjectStorage, Result,
};

use crate::extraction::ExtractionRegistry;

/// Parameters of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub material_id: Uuid,
    pub storage_path: String,
    /// MIME type declared by the client, if any.
    pub file_type: Option<String>,
}

/// Post-processed adapter output, ready to persist.
#[derive(Debug, Clone)]
pub struct ProcessedText {
    pub content: String,
    pub truncated: bool,
    pub strategy: ExtractionStrategy,
    pub metadata: JsonValue,
}

/// Strategy for `kind`, or the rejection a caller should see.
pub fn strategy_for(kind: &FileKind) -> Result<ExtractionStrategy> {
    kind.strategy().ok_or_else(|| match kind {
        FileKind::Unsupported(mime) => Error::UnsupportedFormat(mime.clone()),
        _ => Error::LegacyDocFormat,
    })
}

/// First declared MIME type that is neither blank nor generic.
pub fn declared_mime<'a>(
    requested: Option<&'a str>,
    recorded: Option<&'a str>,
) -> Option<&'a str> {
    [requested, recorded]
        .into_iter()
        .flatten()
        .find(|m| {
            let essence = mime_essence(m);
            !essence.is_empty() && !essence.eq_ignore_ascii_case(GENERIC_MIME)
        })
}

/// Size check, adapter dispatch and post-processing for already-loaded bytes.
///
/// Shared by the HTTP pipeline and the local CLI.
pub async fn extract_and_process(
    registry: &ExtractionRegistry,
    config: &ExtractionConfig,
    kind: &FileKind,
    data: &[u8],
    file_name: &str,
) -> Result<ProcessedText> {
    let strategy = strategy_for(kind)?;

    if data.len() > config.max_file_bytes {
        return Err(Error::FileTooLarge {
            size: data.len(),
            limit: config.max_file_bytes,
        });
    }

    let result = registry
        .extract(strategy, data, file_name, kind.mime_type())
        .await?;

    ensure_usable(&result.extracted_text, config.min_content_chars)?;
    let (content, truncated) = truncate_content(result.extracted_text, config.max_content_chars);

    Ok(ProcessedText {
        content,
        truncated,
        strategy,
        metadata: result.metadata,
    })
}

/// The document extraction service.
pub struct ExtractionService {
    materials: Arc<dyn MaterialRepository>,
    storage: Arc<dyn ObjectStorage>,
    writer: Arc<dyn MaterialContentWriter>,
    registry: Arc<ExtractionRegistry>,
    config: ExtractionConfig,
}

impl ExtractionService {
    pub fn new(
        materials: Arc<dyn MaterialRepository>,
        storage: Arc<dyn ObjectStorage>,
        writer: Arc<dyn MaterialContentWriter>,
        registry: Arc<ExtractionRegistry>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            materials,
            storage,
            writer,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractionRegistry {
        &self.registry
    }

    /// Extract the text of `request.material_id` on behalf of `identity` and
    /// overwrite the material's content with it.
    pub async fn extract(
        &self,
        identity: &Identity,
        request: &ExtractionRequest,
    ) -> Result<ExtractionOutcome> {
        let start = Instant::now();
        let material_id = request.material_id;

        let material = self
            .materials
            .find_owned(material_id, identity.user_id)
            .await?
            .ok_or_else(|| not_found(material_id))?;

        // The recorded object is the only one this material may read.
        if material.storage_path.as_deref() != Some(request.storage_path.as_str()) {
            warn!(
                subsystem = "extraction",
                op = "extract",
                %material_id,
                recorded = material.storage_path.is_some(),
                "Storage path does not match the material's recorded object"
            );
            return Err(not_found(material_id));
        }

        let declared = declared_mime(request.file_type.as_deref(), material.file_type.as_deref());
        let kind = FileKind::detect(declared, &request.storage_path);
        debug!(
            subsystem = "extraction",
            op = "extract",
            %material_id,
            file_kind = kind.label(),
            mime_type = kind.mime_type(),
            "Resolved file kind"
        );

        // Rejected kinds never touch storage.
        strategy_for(&kind)?;

        let data = self
            .storage
            .download(&self.config.bucket, &request.storage_path)
            .await?;
        let size_bytes = data.len();

        let processed = extract_and_process(
            &self.registry,
            &self.config,
            &kind,
            &data,
            &material.file_name,
        )
        .await?;

        self.writer
            .overwrite_content(material_id, &processed.content)
            .await?;

        let content_length = processed.content.chars().count();
        info!(
            subsystem = "extraction",
            op = "extract",
            %material_id,
            file_kind = kind.label(),
            strategy = processed.strategy.as_str(),
            size_bytes,
            content_length,
            truncated = processed.truncated,
            adapter_metadata = %processed.metadata,
            duration_ms = start.elapsed().as_millis() as u64,
            "Extraction persisted"
        );

        Ok(ExtractionOutcome {
            material_id,
            strategy: processed.strategy,
            content_length,
            truncated: processed.truncated,
            preview: preview(&processed.content, self.config.preview_chars),
        })
    }
}

fn not_found(material_id: Uuid) -> Error {
    Error::NotFound(format!("Material {} not found", material_id))
}
