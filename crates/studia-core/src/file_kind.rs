//! File type detection and extraction dispatch.
//!
//! The effective MIME type comes from the declared type when it is specific,
//! otherwise from the storage path's extension. Classification then runs once,
//! in a fixed priority order:
//!
//! 1. DOCX (Office Open XML word processing)
//! 2. PDF or raster image (AI OCR)
//! 3. Legacy binary `.doc` (always rejected)
//! 4. Anything else (unsupported)
//!
//! The legacy check runs after DOCX so that `wordprocessingml` MIME types are
//! never mistaken for the old format, while `application/msword` and any other
//! `word` MIME type still land on the rejection path.

use crate::ExtractionStrategy;

/// MIME type browsers send when they do not know better.
pub const GENERIC_MIME: &str = "application/octet-stream";

/// MIME type of Office Open XML word processing documents.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of the legacy binary Word format.
pub const LEGACY_DOC_MIME: &str = "application/msword";

/// Detected file category, computed once per extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Docx,
    /// PDF or raster image, with the canonical MIME type sent to the gateway.
    PdfOrImage { mime: &'static str },
    LegacyDoc,
    /// Carries the effective MIME type (or extension) for the error message.
    Unsupported(String),
}

impl FileKind {
    /// Classify a file from its declared MIME type and storage path.
    pub fn detect(declared_mime: Option<&str>, storage_path: &str) -> Self {
        match effective_mime(declared_mime, storage_path) {
            Some(mime) => Self::from_mime(&mime),
            None => Self::Unsupported(
                extension(storage_path)
                    .map(|ext| format!(".{}", ext))
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        }
    }

    /// Classify an already-resolved MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime_essence(mime).to_lowercase();

        if mime.contains("wordprocessingml") || mime.contains("docx") {
            return FileKind::Docx;
        }

        if let Some(canonical) = ocr_mime(&mime) {
            return FileKind::PdfOrImage { mime: canonical };
        }

        if mime == LEGACY_DOC_MIME || mime.contains("word") {
            return FileKind::LegacyDoc;
        }

        FileKind::Unsupported(mime)
    }

    /// Extraction strategy for this kind, or `None` when it is rejected.
    pub fn strategy(&self) -> Option<ExtractionStrategy> {
        match self {
            FileKind::Docx => Some(ExtractionStrategy::DocxStructural),
            FileKind::PdfOrImage { .. } => Some(ExtractionStrategy::AiOcr),
            FileKind::LegacyDoc | FileKind::Unsupported(_) => None,
        }
    }

    /// MIME type handed to the extraction adapter.
    pub fn mime_type(&self) -> &str {
        match self {
            FileKind::Docx => DOCX_MIME,
            FileKind::PdfOrImage { mime } => mime,
            FileKind::LegacyDoc => LEGACY_DOC_MIME,
            FileKind::Unsupported(mime) => mime,
        }
    }

    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Docx => "docx",
            FileKind::PdfOrImage { .. } => "pdf_or_image",
            FileKind::LegacyDoc => "legacy_doc",
            FileKind::Unsupported(_) => "unsupported",
        }
    }
}

/// Resolve the MIME type used for dispatch.
///
/// A declared type wins unless it is empty or [`GENERIC_MIME`]; then the
/// storage path's extension decides (case-insensitive).
pub fn effective_mime(declared_mime: Option<&str>, storage_path: &str) -> Option<String> {
    match declared_mime.map(mime_essence) {
        Some(mime) if !mime.is_empty() && !mime.eq_ignore_ascii_case(GENERIC_MIME) => {
            Some(mime.to_lowercase())
        }
        _ => mime_from_extension(storage_path).map(str::to_string),
    }
}

/// `type/subtype` without parameters: `"image/jpeg; q=1"` → `"image/jpeg"`.
pub fn mime_essence(mime: &str) -> &str {
    mime.split(';').next().unwrap_or(mime).trim()
}

/// Map a storage path's extension to a MIME type.
pub fn mime_from_extension(storage_path: &str) -> Option<&'static str> {
    match extension(storage_path)?.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "docx" => Some(DOCX_MIME),
        "doc" => Some(LEGACY_DOC_MIME),
        _ => None,
    }
}

/// Lowercased extension of the last path segment.
fn extension(storage_path: &str) -> Option<String> {
    let file_name = storage_path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn ocr_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "application/pdf" => Some("application/pdf"),
        "image/png" => Some("image/png"),
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_from_declared_mime() {
        assert_eq!(FileKind::detect(Some(DOCX_MIME), "u/file.bin"), FileKind::Docx);
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        assert_eq!(
            FileKind::detect(Some("application/pdf; charset=binary"), "u/upload"),
            FileKind::PdfOrImage { mime: "application/pdf" }
        );
        assert_eq!(
            FileKind::detect(Some("Image/JPEG;q=1"), "u/upload"),
            FileKind::PdfOrImage { mime: "image/jpeg" }
        );
        assert_eq!(
            FileKind::detect(Some("application/octet-stream; name=x"), "u/scan.png"),
            FileKind::PdfOrImage { mime: "image/png" }
        );
        assert_eq!(mime_essence(" text/plain ; charset=utf-8"), "text/plain");
    }

    #[test]
    fn test_docx_from_extension_when_mime_missing() {
        assert_eq!(FileKind::detect(None, "u/Report.DOCX"), FileKind::Docx);
    }

    #[test]
    fn test_generic_mime_falls_back_to_extension() {
        assert_eq!(
            FileKind::detect(Some(GENERIC_MIME), "u/scan.png"),
            FileKind::PdfOrImage { mime: "image/png" }
        );
    }

    #[test]
    fn test_empty_mime_falls_back_to_extension() {
        assert_eq!(
            FileKind::detect(Some("  "), "u/scan.webp"),
            FileKind::PdfOrImage { mime: "image/webp" }
        );
    }

    #[test]
    fn test_uppercase_pdf_extension_routes_to_ocr() {
        let kind = FileKind::detect(None, "user-1/Lecture Notes.PDF");
        assert_eq!(
            kind,
            FileKind::PdfOrImage {
                mime: "application/pdf"
            }
        );
        assert_eq!(kind.strategy(), Some(ExtractionStrategy::AiOcr));
    }

    #[test]
    fn test_jpg_and_jpeg_share_canonical_mime() {
        assert_eq!(
            FileKind::detect(None, "a.jpg"),
            FileKind::PdfOrImage { mime: "image/jpeg" }
        );
        assert_eq!(
            FileKind::detect(Some("image/jpg"), "a"),
            FileKind::PdfOrImage { mime: "image/jpeg" }
        );
    }

    #[test]
    fn test_legacy_doc_from_extension() {
        let kind = FileKind::detect(None, "u/essay.doc");
        assert_eq!(kind, FileKind::LegacyDoc);
        assert_eq!(kind.strategy(), None);
    }

    #[test]
    fn test_legacy_doc_from_msword_mime() {
        assert_eq!(
            FileKind::detect(Some("application/msword"), "u/essay.docx"),
            FileKind::LegacyDoc
        );
    }

    #[test]
    fn test_wordprocessingml_is_not_legacy() {
        assert_eq!(FileKind::from_mime(DOCX_MIME), FileKind::Docx);
    }

    #[test]
    fn test_declared_mime_wins_over_extension() {
        assert_eq!(
            FileKind::detect(Some("text/plain"), "u/file.pdf"),
            FileKind::Unsupported("text/plain".to_string())
        );
    }

    #[test]
    fn test_unsupported_image_type() {
        assert_eq!(
            FileKind::detect(Some("image/gif"), "a.gif"),
            FileKind::Unsupported("image/gif".to_string())
        );
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert_eq!(
            FileKind::detect(None, "u/data.csv"),
            FileKind::Unsupported(".csv".to_string())
        );
        assert_eq!(
            FileKind::detect(None, "u/README"),
            FileKind::Unsupported("unknown".to_string())
        );
    }

    #[test]
    fn test_extension_only_reads_last_segment() {
        assert_eq!(mime_from_extension("folder.pdf/notes"), None);
        assert_eq!(mime_from_extension(".pdf"), None);
    }

    #[test]
    fn test_mime_type_accessor() {
        assert_eq!(FileKind::Docx.mime_type(), DOCX_MIME);
        assert_eq!(
            FileKind::PdfOrImage { mime: "image/png" }.mime_type(),
            "image/png"
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(FileKind::Docx.label(), "docx");
        assert_eq!(FileKind::LegacyDoc.label(), "legacy_doc");
        assert_eq!(FileKind::Unsupported("x".into()).label(), "unsupported");
    }
}
