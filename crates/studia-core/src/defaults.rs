//! Centralized default constants for the studia extraction service.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Runtime overrides come from the environment variables named next
//! to each value.

// =============================================================================
// EXTRACTION LIMITS
// =============================================================================

/// Maximum downloaded file size accepted for extraction (10 MB).
/// Override: `EXTRACTION_MAX_FILE_BYTES`.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of characters persisted as Material content.
/// Override: `EXTRACTION_MAX_CONTENT_CHARS`.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Extracted text shorter than this (after trimming) counts as nothing usable.
/// Override: `EXTRACTION_MIN_CONTENT_CHARS`.
pub const MIN_CONTENT_CHARS: usize = 5;

/// Marker appended to content cut at `MAX_CONTENT_CHARS`.
pub const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

/// Characters of persisted content echoed back in the response preview.
pub const PREVIEW_CHARS: usize = 300;

/// Suffix appended to the response preview.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Ceiling on the decompressed size of `word/document.xml` (50 MB).
pub const MAX_DOCX_XML_BYTES: u64 = 50 * 1024 * 1024;

// =============================================================================
// STORAGE
// =============================================================================

/// Bucket holding uploaded study materials. Override: `STORAGE_BUCKET`.
pub const STORAGE_BUCKET: &str = "study-materials";

/// Root directory for the filesystem storage backend. Override: `STORAGE_PATH`.
pub const STORAGE_PATH: &str = "./data/storage";

// =============================================================================
// LLM GATEWAY
// =============================================================================

/// OpenAI-compatible gateway base URL. Override: `LLM_GATEWAY_URL`.
pub const GATEWAY_URL: &str = "https://openrouter.ai/api/v1";

/// Vision-capable model used for OCR. Override: `LLM_OCR_MODEL`.
pub const OCR_MODEL: &str = "google/gemini-2.5-flash";

/// Sampling temperature for OCR requests. Determinism over fluency.
pub const OCR_TEMPERATURE: f32 = 0.1;

/// Output token ceiling for OCR requests.
pub const OCR_MAX_TOKENS: u32 = 16_000;

/// Gateway request timeout in seconds. Override: `LLM_TIMEOUT`.
pub const GATEWAY_TIMEOUT_SECS: u64 = 300;

/// Characters of a failing gateway response body kept for diagnostics.
pub const GATEWAY_ERROR_BODY_CHARS: usize = 500;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum accepted JSON request body.
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

/// Default database URL for the caller-scoped pool.
pub const DATABASE_URL: &str = "postgres://localhost/studia";
