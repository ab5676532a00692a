//! Document text extraction endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use studia_extract::ExtractionRequest;

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Request body. Fields are optional here so that missing values produce a
/// 400 with a useful message instead of a deserializer error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentRequest {
    pub storage_path: Option<String>,
    pub material_id: Option<String>,
    pub file_type: Option<String>,
}

/// Successful extraction summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentResponse {
    pub success: bool,
    pub content_length: usize,
    pub preview: String,
}

impl ExtractDocumentRequest {
    fn validate(self) -> Result<ExtractionRequest, ApiError> {
        let storage_path = self.storage_path.filter(|s| !s.trim().is_empty());
        let material_id = self.material_id.filter(|s| !s.trim().is_empty());
        let (Some(storage_path), Some(material_id)) = (storage_path, material_id) else {
            return Err(ApiError::BadRequest(
                "storagePath and materialId are required".to_string(),
            ));
        };

        let material_id = Uuid::parse_str(material_id.trim())
            .map_err(|_| ApiError::BadRequest("materialId must be a valid UUID".to_string()))?;

        Ok(ExtractionRequest {
            material_id,
            storage_path,
            file_type: self.file_type,
        })
    }
}

/// Extract the text of an uploaded material and store it as its content.
///
/// # Returns
/// - 200 with `{success, contentLength, preview}`
/// - 400 for malformed input, legacy `.doc`, unsupported or oversized files
/// - 401 without a valid bearer token
/// - 404 when the material does not exist or belongs to someone else
/// - 413 / 429 when the AI service refuses the file or is rate limited
/// - 422 when no meaningful text could be extracted
pub async fn extract_document_text(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<ExtractDocumentRequest>, JsonRejection>,
) -> Result<Json<ExtractDocumentResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let request = body.validate()?;

    let outcome = state.extraction.extract(&identity, &request).await?;

    Ok(Json(ExtractDocumentResponse {
        success: true,
        content_length: outcome.content_length,
        preview: outcome.preview,
    }))
}
